//! Frame-coherent mouse state tracker.
//!
//! [`MouseState`] accumulates winit mouse events between redraws and exposes
//! position, drag delta, button state and scroll for the orbit controls.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scroll treated as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

/// Maps a [`MouseButton`] to an index 0..3.
fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Frame-coherent mouse state.
///
/// Forward winit events through the `on_*` methods, read the accessors while
/// updating, then call [`clear_transients`](Self::clear_transients) once per frame.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    /// `None` until the first `CursorMoved` so the first sample yields no delta.
    position: Option<Vec2>,
    delta: Vec2,
    pressed: [bool; 3],
    scroll: f32,
    cursor_in_window: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event (physical pixels).
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(old) = self.position {
            self.delta += new_pos - old;
        }
        self.position = Some(new_pos);
    }

    /// Process a `MouseInput` event.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if let Some(idx) = button_index(button) {
            self.pressed[idx] = state == ElementState::Pressed;
        }
    }

    /// Process a `MouseWheel` event. Positive is away from the user.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => {
                self.scroll += y;
            }
            MouseScrollDelta::PixelDelta(pos) => {
                self.scroll += (pos.y / PIXELS_PER_LINE) as f32;
            }
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    /// Process a `CursorLeft` event. Buttons are released since their release
    /// events may never arrive.
    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        self.position = None;
        self.pressed = [false; 3];
    }

    /// Clears per-frame transients: delta and scroll.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Current cursor position, if the cursor has been seen.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Movement since the last clear.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|idx| self.pressed[idx])
    }

    /// Scroll accumulated since the last clear, in wheel notches.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_has_no_delta() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        assert_eq!(ms.position(), Some(Vec2::new(100.0, 200.0)));
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_delta_accumulates_between_clears() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        ms.on_cursor_moved(105.0, 198.0);
        ms.on_cursor_moved(110.0, 195.0);
        assert_eq!(ms.delta(), Vec2::new(10.0, -5.0));

        ms.clear_transients();
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_button_press_and_release_tracked() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(ms.is_button_pressed(MouseButton::Left));
        assert!(!ms.is_button_pressed(MouseButton::Right));

        ms.on_button(MouseButton::Left, ElementState::Released);
        assert!(!ms.is_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_extra_buttons_ignored() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Back, ElementState::Pressed);
        assert!(!ms.is_button_pressed(MouseButton::Back));
    }

    #[test]
    fn test_scroll_accumulates_within_frame() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 0.5));
        assert!((ms.scroll() - 1.5).abs() < f32::EPSILON);

        ms.clear_transients();
        assert_eq!(ms.scroll(), 0.0);
    }

    #[test]
    fn test_pixel_scroll_normalized() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, -80.0),
        ));
        assert!((ms.scroll() + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cursor_left_releases_buttons() {
        let mut ms = MouseState::new();
        ms.on_cursor_entered();
        ms.on_cursor_moved(10.0, 10.0);
        ms.on_button(MouseButton::Right, ElementState::Pressed);
        ms.on_cursor_left();
        assert!(!ms.is_cursor_in_window());
        assert!(!ms.is_button_pressed(MouseButton::Right));

        // Re-entering elsewhere must not produce a jump.
        ms.on_cursor_moved(500.0, 400.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }
}

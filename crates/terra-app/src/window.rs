//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it creates the
//! window and GPU context on `resumed`, feeds mouse events to the scene, and
//! on every redraw uploads finished textures, advances the scene and renders.

use std::sync::Arc;
use std::time::Duration;

use terra_assets::{DEFAULT_WORKERS, LoadState, TextureLoader, TextureSource};
use terra_config::Config;
use terra_input::MouseState;
use terra_planet::TextureSlot;
use terra_render::{
    GpuOptions, RenderContext, SurfaceError, SurfaceWrapper, init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::context::{SceneContext, epoch_millis};
use crate::frame_clock::{FrameClock, FrameStats};
use crate::renderer::SceneRenderer;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Source string for each slot, in [`TextureSlot::ALL`] order.
fn texture_sources(config: &Config) -> [(TextureSlot, &str); 3] {
    [
        (TextureSlot::ColorMap, config.textures.color_map.as_str()),
        (TextureSlot::SpecularMap, config.textures.specular_map.as_str()),
        (TextureSlot::CloudMap, config.textures.cloud_map.as_str()),
    ]
}

/// Application state: window, GPU, scene and texture loader.
pub struct AppState {
    pub config: Config,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    /// Normalizes resize and DPI events into physical sizes.
    pub surface_wrapper: SurfaceWrapper,
    /// Created with the window so the camera starts at the real aspect ratio.
    scene: Option<SceneContext>,
    mouse: MouseState,
    loader: TextureLoader<TextureSlot>,
    /// States recorded before the scene exists.
    early_failures: Vec<(TextureSlot, String)>,
    clock: FrameClock,
    stats: FrameStats,
}

impl AppState {
    /// Set up state and start fetching textures; the window opens on `resumed`.
    pub fn with_config(config: Config) -> Self {
        let mut loader = TextureLoader::new(
            DEFAULT_WORKERS,
            Duration::from_secs(config.textures.fetch_timeout_secs),
        );
        let mut early_failures = Vec::new();
        for (slot, source) in texture_sources(&config) {
            let source = TextureSource::parse(source);
            info!("Requesting {slot} from {source}");
            if let Err(e) = loader.submit(slot, source) {
                warn!("Could not queue {slot}: {e}");
                early_failures.push((slot, e.to_string()));
            }
        }

        Self {
            clock: FrameClock::new(config.scene.tick_rate_hz),
            stats: FrameStats::new(config.debug.frame_stats_interval_secs),
            surface_wrapper: SurfaceWrapper::new(config.window.width, config.window.height, 1.0),
            config,
            window: None,
            gpu: None,
            renderer: None,
            scene: None,
            mouse: MouseState::new(),
            loader,
            early_failures,
        }
    }

    /// Apply a new physical size to the scene, surface and render targets.
    fn apply_resize(&mut self, width: u32, height: u32) {
        if let Some(scene) = &mut self.scene {
            scene.resize(width, height);
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, &gpu.queue, width, height);
            }
        }
    }

    /// Upload every texture that finished since the last frame.
    fn receive_textures(&mut self) {
        let (Some(gpu), Some(renderer), Some(scene)) =
            (&self.gpu, &mut self.renderer, &mut self.scene)
        else {
            return;
        };

        for (slot, reason) in self.early_failures.drain(..) {
            scene.set_texture_state(slot, LoadState::Failed(reason));
        }

        for result in self.loader.drain_results() {
            let slot = result.key;
            let state = match result.image {
                Ok(image) => {
                    match renderer.upload_texture(&gpu.device, &gpu.queue, slot, &image) {
                        Ok(()) => {
                            info!(
                                "Loaded {slot} ({}x{}) from {} in {:.0?}",
                                image.width, image.height, result.source, result.elapsed
                            );
                            LoadState::Ready
                        }
                        Err(e) => {
                            warn!("Upload of {slot} failed, keeping placeholder: {e}");
                            LoadState::Failed(e.to_string())
                        }
                    }
                }
                Err(e) => {
                    warn!("Loading {slot} from {} failed, keeping placeholder: {e}", result.source);
                    LoadState::Failed(e.to_string())
                }
            };
            scene.set_texture_state(slot, state);
            if scene.textures_settled() {
                debug!(
                    "All textures settled, {} loads in flight",
                    self.loader.in_flight_count()
                );
            }
        }
    }

    /// Advance and draw one frame. Returns `false` if the app should exit.
    fn redraw(&mut self) -> bool {
        self.receive_textures();

        let ticks = self.clock.tick();
        if let Some(fps) = self.stats.record(self.clock.last_frame_secs()) {
            info!(
                "{fps:.1} fps ({} frames, {} ticks)",
                self.clock.frame_count(),
                self.clock.tick_count()
            );
        }

        let (Some(gpu), Some(renderer), Some(scene)) =
            (&mut self.gpu, &self.renderer, &mut self.scene)
        else {
            return true;
        };

        scene.apply_input(&self.mouse);
        scene.advance(ticks, epoch_millis());

        match renderer.render(gpu, scene) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                let size = self.surface_wrapper.physical_size();
                gpu.resize(size.width, size.height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                return false;
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }
        true
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );

        let scale_factor = window.scale_factor();
        let inner_size = window.inner_size();
        self.surface_wrapper =
            SurfaceWrapper::new(inner_size.width, inner_size.height, scale_factor);
        info!(
            "Surface wrapper initialized: {}x{} (scale: {:.2})",
            inner_size.width, inner_size.height, scale_factor
        );

        let options = GpuOptions {
            vsync: self.config.window.vsync,
            msaa_samples: self.config.render.msaa_samples,
        };
        let gpu = match init_render_context_blocking(window.clone(), options) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let scene = SceneContext::from_config(&self.config, gpu.size());
        match SceneRenderer::new(&gpu, &scene, &self.config) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                error!("Scene setup failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.scene = Some(scene);
        self.gpu = Some(gpu);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    let (w, h) = (resize.physical.width, resize.physical.height);
                    self.apply_resize(w, h);
                    info!(
                        "Window resized to {}x{} (scale: {:.2})",
                        w, h, resize.scale_factor
                    );
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(window) = &self.window else {
                    return;
                };
                let inner = window.inner_size();
                if let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                    scale_factor,
                    inner.width,
                    inner.height,
                ) {
                    let (w, h) = (resize.physical.width, resize.physical.height);
                    self.apply_resize(w, h);
                    info!(
                        "Scale factor changed to {:.2}, resized to {}x{}",
                        scale_factor, w, h
                    );
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.mouse.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                if !self.redraw() {
                    event_loop.exit();
                    return;
                }
                self.mouse.clear_transients();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Create the event loop and run the viewer until the window closes.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::with_config(config);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.title = "Earth".into();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Earth");
        assert!(attrs.fullscreen.is_none());

        config.window.fullscreen = true;
        let attrs = window_attributes_from_config(&config);
        assert!(matches!(attrs.fullscreen, Some(Fullscreen::Borderless(None))));
    }

    #[test]
    fn test_texture_sources_cover_every_slot() {
        let config = Config::default();
        let sources = texture_sources(&config);
        for (i, (slot, source)) in sources.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert!(matches!(TextureSource::parse(source), TextureSource::Url(_)));
        }
    }

    #[test]
    fn test_missing_texture_files_fail_without_window() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = Config::default();
        config.textures.rebase_to_dir(tmp.path());
        let mut app = AppState::with_config(config);

        let mut results = Vec::new();
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while results.len() < 3 && std::time::Instant::now() < deadline {
            results.extend(app.loader.drain_results());
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.image.is_err()));
        assert!(app.scene.is_none());
        assert!(app.redraw(), "redraw without a window is a no-op");
    }
}

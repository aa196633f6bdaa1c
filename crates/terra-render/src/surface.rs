//! Window surface size tracking.
//!
//! Reports physical pixel dimensions for surface configuration and clamps
//! zero sizes (minimized windows, Wayland before the first configure) to 1x1.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
}

impl PhysicalSize {
    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Emitted when the physical size of the surface actually changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResizeEvent {
    /// New physical pixel dimensions.
    pub physical: PhysicalSize,
    /// Physical pixels per logical pixel.
    pub scale_factor: f64,
}

/// Tracks the window's physical size and scale factor between events.
pub struct SurfaceWrapper {
    size: PhysicalSize,
    scale_factor: f64,
    /// Whether a non-zero size has been observed.
    configured: bool,
}

impl SurfaceWrapper {
    /// Start tracking from the window's initial physical size.
    ///
    /// A zero initial size is clamped and the wrapper stays unconfigured until
    /// a real size arrives.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            size: PhysicalSize {
                width: physical_width.max(MIN_SURFACE_DIMENSION),
                height: physical_height.max(MIN_SURFACE_DIMENSION),
            },
            scale_factor,
            configured: physical_width > 0 && physical_height > 0,
        }
    }

    /// Record a new physical size. Returns `None` when nothing changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let size = PhysicalSize {
            width: physical_width.max(MIN_SURFACE_DIMENSION),
            height: physical_height.max(MIN_SURFACE_DIMENSION),
        };
        if physical_width > 0 && physical_height > 0 {
            self.configured = true;
        }
        if size == self.size {
            return None;
        }
        self.size = size;

        Some(SurfaceResizeEvent {
            physical: size,
            scale_factor: self.scale_factor,
        })
    }

    /// Record a DPI change (window moved between displays or scaling changed).
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = new_scale_factor;
        self.handle_resize(new_physical_width, new_physical_height)
    }

    /// Current physical pixel dimensions.
    pub fn physical_size(&self) -> PhysicalSize {
        self.size
    }

    /// Current scale factor.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Whether a non-zero size has been seen.
    pub fn is_ready(&self) -> bool {
        self.configured
    }
}

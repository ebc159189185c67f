//! # Display Modes
//!
//! A mode is what the timing generator talks to: one [`Timing`] plus one
//! top-level [`Rasterizer`], which may be a transform chain.
//!
//! ## Lifecycle
//!
//! 1. Build the mode (framebuffers come from the arena)
//! 2. `activate()` once, before the first scanline
//! 3. `rasterize(line, target)` once per active line, forever
//!
//! A mode never interprets pixel formats itself.

pub mod raster_800x600x1;
pub mod timing;

use log::{info, warn};

use crate::rast::{LineShape, Pixel, Rasterizer};

pub use raster_800x600x1::Raster800x600x1;
pub use timing::{Polarity, Timing};

/// One-time peripheral setup for a mode, supplied by the platform.
pub type ActivateHook = fn(&Timing);

pub trait Mode {
    /// Configures the hardware for this mode. Only the first call has effect.
    fn activate(&mut self);

    fn timing(&self) -> &Timing;

    /// Forwards to the top-level rasterizer.
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape;
}

/// Binds a timing to a rasterizer.
pub struct RasterMode<R> {
    name: &'static str,
    timing: Timing,
    rasterizer: R,
    hook: Option<ActivateHook>,
    active: bool,
}

impl<R: Rasterizer> RasterMode<R> {
    pub const fn new(name: &'static str, timing: Timing, rasterizer: R) -> Self {
        Self {
            name,
            timing,
            rasterizer,
            hook: None,
            active: false,
        }
    }

    pub fn with_hook(mut self, hook: ActivateHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }
}

impl<R: Rasterizer> Mode for RasterMode<R> {
    fn activate(&mut self) {
        if self.active {
            warn!("mode {}: already active, ignoring", self.name);
            return;
        }
        info!(
            "mode {}: activating ({} active lines, {} Hz pixel clock)",
            self.name,
            self.timing.active_lines(),
            self.timing.pixel_clock_hz
        );
        if let Some(hook) = self.hook {
            hook(&self.timing);
        }
        self.active = true;
    }

    fn timing(&self) -> &Timing {
        &self.timing
    }

    #[inline(always)]
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        self.rasterizer.rasterize(line_number, target)
    }
}

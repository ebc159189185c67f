//! 800x600 two-colour bitmap mode.
use crate::allocators::Arena;
use crate::rast::{Bitmap1, LineShape, Pixel};

use super::{ActivateHook, Mode, RasterMode, Timing};

pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 600;

/// Full-resolution 1 bpp mode at SVGA 60 Hz. Takes two 60000-byte pages
/// from the arena.
pub struct Raster800x600x1 {
    mode: RasterMode<Bitmap1>,
}

impl Raster800x600x1 {
    pub fn new(arena: &mut Arena) -> Self {
        Self {
            mode: RasterMode::new(
                "800x600x1",
                Timing::SVGA_800X600_60HZ,
                Bitmap1::new(arena, WIDTH, HEIGHT),
            ),
        }
    }

    pub fn with_hook(self, hook: ActivateHook) -> Self {
        Self {
            mode: self.mode.with_hook(hook),
        }
    }

    pub fn rasterizer(&mut self) -> &mut Bitmap1 {
        self.mode.rasterizer_mut()
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_active()
    }
}

impl Mode for Raster800x600x1 {
    fn activate(&mut self) {
        self.mode.activate();
    }

    fn timing(&self) -> &Timing {
        self.mode.timing()
    }

    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        self.mode.rasterize(line_number, target)
    }
}

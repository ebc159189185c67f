//! Direct colour, one byte per source pixel, shown four output pixels wide.
use crate::allocators::Arena;

use super::unpack::{unpack_direct_x4, DIRECT_SCALE};
use super::{rasterize_row, LineShape, Pages, Pixel, Rasterizer, RowSource};

pub struct Direct4 {
    width: usize,
    height: usize,
    pages: Pages,
}

impl Direct4 {
    /// `width` and `height` are in source pixels.
    pub fn new(arena: &mut Arena, width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pages: Pages::new(arena, width * height),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn front(&self) -> &[u8] {
        self.pages.front()
    }

    pub fn back_mut(&mut self) -> &mut [u8] {
        self.pages.back_mut()
    }

    pub fn flip(&self) {
        self.pages.flip();
    }

    pub fn copy_front_to_back(&mut self) {
        self.pages.copy_front_to_back();
    }

    pub fn set_back_pixel(&mut self, x: usize, y: usize, value: Pixel) {
        // SAFETY: `&mut self` is the only view of the pages.
        unsafe { self.write_back_pixel(x, y, value) }
    }

    /// [`Direct4::set_back_pixel`] through a shared borrow, for drawing while
    /// a transform borrows this framebuffer.
    ///
    /// # Safety
    ///
    /// See [`Pages::back_shared`].
    pub unsafe fn write_back_pixel(&self, x: usize, y: usize, value: Pixel) {
        if x < self.width && y < self.height {
            self.pages.back_shared()[y * self.width + x] = value;
        }
    }
}

impl RowSource for Direct4 {
    fn rows(&self) -> usize {
        self.height
    }

    fn row_pixels(&self) -> usize {
        self.width * DIRECT_SCALE
    }

    #[inline(always)]
    fn unpack_row(&self, row: usize, target: &mut [Pixel]) {
        let start = row * self.width;
        unpack_direct_x4(&self.pages.front()[start..start + self.width], target);
    }
}

impl Rasterizer for Direct4 {
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        rasterize_row(self, Some(line_number), target)
    }
}

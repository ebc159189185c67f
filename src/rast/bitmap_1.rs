//! Two-colour bitmap, one bit per pixel.
use crate::allocators::Arena;

use super::unpack::unpack_1bpp;
use super::{rasterize_row, LineShape, Pages, Pixel, Rasterizer, RowSource};

/// 1 bpp framebuffer, MSB-first within each byte, double buffered.
///
/// A clear bit shows the background colour, a set bit the foreground.
pub struct Bitmap1 {
    width: usize,
    height: usize,
    stride: usize,
    pages: Pages,
    palette: [Pixel; 2],
}

impl Bitmap1 {
    pub const DEFAULT_BACKGROUND: Pixel = 0x00;
    pub const DEFAULT_FOREGROUND: Pixel = 0xFF;

    /// `width` is in pixels. Rows are padded to whole bytes.
    pub fn new(arena: &mut Arena, width: usize, height: usize) -> Self {
        let stride = (width + 7) / 8;
        Self {
            width,
            height,
            stride,
            pages: Pages::new(arena, stride * height),
            palette: [Self::DEFAULT_BACKGROUND, Self::DEFAULT_FOREGROUND],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per stored row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn set_colors(&mut self, background: Pixel, foreground: Pixel) {
        self.palette = [background, foreground];
    }

    pub fn colors(&self) -> [Pixel; 2] {
        self.palette
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

    /// Sets or clears one pixel of the back page. Out-of-bounds is ignored.
    pub fn set_back_pixel(&mut self, x: usize, y: usize, on: bool) {
        // SAFETY: `&mut self` is the only view of the pages.
        unsafe { self.write_back_pixel(x, y, on) }
    }

    /// [`Bitmap1::set_back_pixel`] through a shared borrow.
    ///
    /// # Safety
    ///
    /// See [`Pages::back_shared`].
    pub unsafe fn write_back_pixel(&self, x: usize, y: usize, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.stride + x / 8;
        let mask = 0x80u8 >> (x % 8);
        let back = self.pages.back_shared();
        if on {
            back[index] |= mask;
        } else {
            back[index] &= !mask;
        }
    }
}

impl RowSource for Bitmap1 {
    fn rows(&self) -> usize {
        self.height
    }

    fn row_pixels(&self) -> usize {
        self.width
    }

    #[inline(always)]
    fn unpack_row(&self, row: usize, target: &mut [Pixel]) {
        let start = row * self.stride;
        let src = &self.pages.front()[start..start + self.stride];
        unpack_1bpp(src, self.palette, target);
    }
}

impl Rasterizer for Bitmap1 {
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        rasterize_row(self, Some(line_number), target)
    }
}

//! Sixteen-colour framebuffer, two pixels per byte.
use crate::allocators::Arena;

use super::unpack::unpack_4bpp;
use super::{rasterize_row, LineShape, Pages, Pixel, Rasterizer, RowSource};

/// 4 bpp framebuffer, high nibble is the left pixel. Each nibble indexes a
/// 16-entry palette of output bytes.
pub struct Packed4 {
    width: usize,
    height: usize,
    stride: usize,
    pages: Pages,
    palette: [Pixel; 16],
}

impl Packed4 {
    pub fn new(arena: &mut Arena, width: usize, height: usize) -> Self {
        let stride = (width + 1) / 2;
        let mut palette = [0; 16];
        for (i, entry) in palette.iter_mut().enumerate() {
            *entry = i as Pixel;
        }
        Self {
            width,
            height,
            stride,
            pages: Pages::new(arena, stride * height),
            palette,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn set_palette(&mut self, palette: [Pixel; 16]) {
        self.palette = palette;
    }

    pub fn palette(&self) -> &[Pixel; 16] {
        &self.palette
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

    /// Writes palette index `index & 0xF` into the back page.
    pub fn set_back_pixel(&mut self, x: usize, y: usize, index: u8) {
        // SAFETY: `&mut self` is the only view of the pages.
        unsafe { self.write_back_pixel(x, y, index) }
    }

    /// # Safety
    ///
    /// See [`Pages::back_shared`].
    pub unsafe fn write_back_pixel(&self, x: usize, y: usize, index: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let byte = &mut self.pages.back_shared()[y * self.stride + x / 2];
        let index = index & 0x0F;
        *byte = if x % 2 == 0 {
            (*byte & 0x0F) | (index << 4)
        } else {
            (*byte & 0xF0) | index
        };
    }
}

impl RowSource for Packed4 {
    fn rows(&self) -> usize {
        self.height
    }

    fn row_pixels(&self) -> usize {
        self.width
    }

    #[inline(always)]
    fn unpack_row(&self, row: usize, target: &mut [Pixel]) {
        let start = row * self.stride;
        unpack_4bpp(&self.pages.front()[start..start + self.stride], &self.palette, target);
    }
}

impl Rasterizer for Packed4 {
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        rasterize_row(self, Some(line_number), target)
    }
}

//! Framebuffer writers using embedded-graphics
use core::convert::Infallible;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{BinaryColor, Gray4, GrayColor, PixelColor, Rgb888},
    Pixel,
};

use super::color::Color;
use crate::rast::{Bitmap1, Direct4, Packed4};

/// Yields in-bounds `(x, y, color)` for a `width` x `height` surface.
fn clipped<C, I>(pixels: I, width: usize, height: usize) -> impl Iterator<Item = (usize, usize, C)>
where
    C: PixelColor,
    I: IntoIterator<Item = Pixel<C>>,
{
    pixels.into_iter().filter_map(move |Pixel(Point { x, y }, color)| {
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            None
        } else {
            Some((x as usize, y as usize, color))
        }
    })
}

/// A framebuffer format whose back page can be drawn through `&self`.
pub trait Surface {
    type Color: PixelColor;

    fn surface_size(&self) -> (usize, usize);

    /// Writes one pixel of the back page. Out-of-bounds is ignored.
    ///
    /// # Safety
    ///
    /// See [`crate::rast::Pages::back_shared`].
    unsafe fn put_pixel(&self, x: usize, y: usize, color: Self::Color);
}

impl Surface for Bitmap1 {
    type Color = BinaryColor;

    fn surface_size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    unsafe fn put_pixel(&self, x: usize, y: usize, color: BinaryColor) {
        self.write_back_pixel(x, y, color.is_on());
    }
}

impl Surface for Direct4 {
    type Color = Rgb888;

    fn surface_size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    unsafe fn put_pixel(&self, x: usize, y: usize, color: Rgb888) {
        self.write_back_pixel(x, y, Color::from(color).to_pixel());
    }
}

/// Gray levels map straight to palette indices.
impl Surface for Packed4 {
    type Color = Gray4;

    fn surface_size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    unsafe fn put_pixel(&self, x: usize, y: usize, color: Gray4) {
        self.write_back_pixel(x, y, color.luma());
    }
}

/// Draws into the back page of a framebuffer that a transform is also
/// borrowing for scanout. Flip the framebuffer itself when the frame is done.
pub struct Canvas<'a, S: ?Sized> {
    surface: &'a S,
}

impl<'a, S: Surface + ?Sized> Canvas<'a, S> {
    /// # Safety
    ///
    /// For as long as the canvas lives, it is the only writer to the
    /// surface's pages and the surface is not flipped. See
    /// [`crate::rast::Pages::back_shared`].
    pub unsafe fn new(surface: &'a S) -> Self {
        Self { surface }
    }
}

impl<'a, S: Surface + ?Sized> DrawTarget for Canvas<'a, S> {
    type Color = S::Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.surface.surface_size();
        for (x, y, color) in clipped(pixels, width, height) {
            // SAFETY: upheld by whoever built the canvas.
            unsafe { self.surface.put_pixel(x, y, color) };
        }
        Ok(())
    }
}

impl<'a, S: Surface + ?Sized> OriginDimensions for Canvas<'a, S> {
    fn size(&self) -> Size {
        let (width, height) = self.surface.surface_size();
        Size::new(width as u32, height as u32)
    }
}

impl DrawTarget for Bitmap1 {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for (x, y, color) in clipped(pixels, self.width(), self.height()) {
            self.set_back_pixel(x, y, color.is_on());
        }
        Ok(())
    }
}

impl OriginDimensions for Bitmap1 {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl DrawTarget for Direct4 {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for (x, y, color) in clipped(pixels, self.width(), self.height()) {
            self.set_back_pixel(x, y, Color::from(color).to_pixel());
        }
        Ok(())
    }
}

impl OriginDimensions for Direct4 {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl DrawTarget for Packed4 {
    type Color = Gray4;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for (x, y, color) in clipped(pixels, self.width(), self.height()) {
            self.set_back_pixel(x, y, color.luma());
        }
        Ok(())
    }
}

impl OriginDimensions for Packed4 {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::{
        pixelcolor::{BinaryColor, Gray4, GrayColor, Rgb888},
        prelude::*,
        primitives::{Line, PrimitiveStyle, Rectangle},
    };

    use super::Canvas;
    use crate::allocators::test_arena;
    use crate::framebuffer::Color;
    use crate::rast::{Bitmap1, Direct4, Mirror, Packed4, Rasterizer};

    #[test]
    fn test_bitmap_rectangle() {
        let mut arena = test_arena(1024);
        let mut bm = Bitmap1::new(&mut arena, 16, 4);
        bm.set_colors(0, 1);

        Rectangle::new(Point::new(6, 1), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut bm)
            .ok();
        bm.flip();

        assert_eq!(bm.front(), &[0, 0, 0x03, 0xC0, 0x03, 0xC0, 0, 0]);

        let mut target = [9u8; 16];
        bm.rasterize(1, &mut target);
        assert_eq!(target, [0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_bitmap_clips_and_clears() {
        let mut arena = test_arena(1024);
        let mut bm = Bitmap1::new(&mut arena, 8, 2);
        bm.clear(BinaryColor::On).ok();
        Line::new(Point::new(-4, 0), Point::new(20, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 1))
            .draw(&mut bm)
            .ok();
        bm.flip();
        assert_eq!(bm.front(), &[0x00, 0xFF]);
    }

    #[test]
    fn test_direct_takes_rgb() {
        let mut arena = test_arena(1024);
        let mut direct = Direct4::new(&mut arena, 2, 1);
        Pixel(Point::new(1, 0), Rgb888::new(255, 0, 0))
            .draw(&mut direct)
            .ok();
        direct.flip();
        assert_eq!(direct.front(), &[0, Color::RED.to_pixel()]);
        assert_eq!(direct.size(), Size::new(2, 1));
    }

    #[test]
    fn test_packed_takes_gray_levels() {
        let mut arena = test_arena(1024);
        let mut packed = Packed4::new(&mut arena, 4, 1);
        packed.clear(Gray4::new(0x3)).ok();
        Pixel(Point::new(2, 0), Gray4::WHITE).draw(&mut packed).ok();
        packed.flip();
        assert_eq!(packed.front(), &[0x33, 0xF3]);
    }

    #[test]
    fn test_canvas_redraws_under_mirror() {
        let mut arena = test_arena(1024);
        let bm = Bitmap1::new(&mut arena, 8, 2);
        let bm: &'static Bitmap1 = arena.alloc_value(bm);
        let mut mirror = Mirror::with_scale(bm, 0, 1);
        let mut target = [9u8; 8];

        {
            let mut canvas = unsafe { Canvas::new(bm) };
            assert_eq!(canvas.size(), Size::new(8, 2));
            Rectangle::new(Point::new(0, 1), Size::new(2, 1))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(&mut canvas)
                .ok();
        }
        mirror.rasterize(0, &mut target);
        assert_eq!(target, [0x00; 8]);

        bm.flip();
        mirror.rasterize(0, &mut target);
        assert_eq!(target, [0xFF, 0xFF, 0, 0, 0, 0, 0, 0]);

        {
            let mut canvas = unsafe { Canvas::new(bm) };
            canvas.clear(BinaryColor::Off).ok();
            Pixel(Point::new(7, 1), BinaryColor::On).draw(&mut canvas).ok();
        }
        bm.flip();
        mirror.rasterize(0, &mut target);
        assert_eq!(target, [0, 0, 0, 0, 0, 0, 0, 0xFF]);
    }
}

//! Geometric transforms over a borrowed [`RowSource`].
//!
//! Every transform does the same three steps: translate the physical line to a
//! source row, bounds check (blank when out of range), then hand the row to
//! the unchanged format decoder.
use super::{rasterize_row, LineShape, Pixel, Rasterizer, RowSource};

/// Physical lines per source row in the mirror effect.
pub const MIRROR_SCALE: usize = 4;

/// Vertical placement of a transformed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First physical line the image occupies.
    pub top_line: usize,
    /// Physical lines per source row. Never zero.
    pub scale: usize,
}

impl Window {
    pub const fn new(top_line: usize, scale: usize) -> Self {
        Self {
            top_line,
            scale: if scale == 0 { 1 } else { scale },
        }
    }

    /// Source row shown on `line_number`, if any.
    ///
    /// Lines above `top_line` are out of range, not wrapped.
    #[inline(always)]
    pub fn source_row(&self, line_number: usize, rows: usize) -> Option<usize> {
        let row = line_number.checked_sub(self.top_line)? / self.scale;
        if row < rows {
            Some(row)
        } else {
            None
        }
    }

    /// Physical lines covered by `rows` source rows.
    pub fn span(&self, rows: usize) -> usize {
        rows * self.scale
    }
}

/// Shows each row of `inner` on `scale` consecutive lines, from `top_line` down.
pub struct Scaled<'a, S: ?Sized> {
    inner: &'a S,
    window: Window,
}

impl<'a, S: RowSource + ?Sized> Scaled<'a, S> {
    pub fn new(inner: &'a S, top_line: usize, scale: usize) -> Self {
        Self {
            inner,
            window: Window::new(top_line, scale),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }
}

impl<'a, S: RowSource + ?Sized> Rasterizer for Scaled<'a, S> {
    #[inline]
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        let row = self.window.source_row(line_number, self.inner.rows());
        rasterize_row(self.inner, row, target)
    }
}

/// Vertically flipped, line-replicated view of `inner`: a reflection.
///
/// Borrows `inner`; it holds no framebuffer of its own. The last source row
/// appears first, each on [`MIRROR_SCALE`] lines unless built with
/// [`Mirror::with_scale`].
pub struct Mirror<'a, S: ?Sized> {
    inner: &'a S,
    window: Window,
}

impl<'a, S: RowSource + ?Sized> Mirror<'a, S> {
    pub fn new(inner: &'a S, top_line: usize) -> Self {
        Self::with_scale(inner, top_line, MIRROR_SCALE)
    }

    pub fn with_scale(inner: &'a S, top_line: usize, scale: usize) -> Self {
        Self {
            inner,
            window: Window::new(top_line, scale),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }
}

impl<'a, S: RowSource + ?Sized> Rasterizer for Mirror<'a, S> {
    #[inline]
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        let rows = self.inner.rows();
        let row = self
            .window
            .source_row(line_number, rows)
            .map(|row| rows - 1 - row);
        rasterize_row(self.inner, row, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocators::test_arena;
    use crate::rast::{Bitmap1, Direct4};

    /// 2x3 direct framebuffer whose row `r` holds `[r*10 + 1, r*10 + 2]`.
    fn numbered_rows() -> Direct4 {
        let mut arena = test_arena(1024);
        let mut direct = Direct4::new(&mut arena, 2, 3);
        for y in 0..3 {
            for x in 0..2 {
                direct.set_back_pixel(x, y, (y * 10 + x + 1) as Pixel);
            }
        }
        direct.flip();
        direct
    }

    fn decode(r: &mut impl Rasterizer, line: usize) -> Option<[Pixel; 8]> {
        let mut target = [0u8; 8];
        let shape = r.rasterize(line, &mut target);
        if shape.is_empty() {
            None
        } else {
            assert_eq!(shape, LineShape::new(0, 8));
            Some(target)
        }
    }

    #[test]
    fn test_window_rejects_lines_above_top() {
        let window = Window::new(100, 4);
        assert_eq!(window.source_row(99, 10), None);
        assert_eq!(window.source_row(0, 10), None);
        assert_eq!(window.source_row(100, 10), Some(0));
        assert_eq!(window.source_row(103, 10), Some(0));
        assert_eq!(window.source_row(104, 10), Some(1));
        assert_eq!(window.source_row(139, 10), Some(9));
        assert_eq!(window.source_row(140, 10), None);
        assert_eq!(window.span(10), 40);
    }

    #[test]
    fn test_zero_scale_means_one() {
        assert_eq!(Window::new(0, 0).scale, 1);
    }

    #[test]
    fn test_scaled_repeats_rows() {
        let direct = numbered_rows();
        let mut scaled = Scaled::new(&direct, 10, 2);
        assert_eq!(decode(&mut scaled, 9), None);
        assert_eq!(decode(&mut scaled, 10), decode(&mut scaled, 11));
        assert_eq!(decode(&mut scaled, 12).unwrap()[0], 11);
        assert_eq!(decode(&mut scaled, 15).unwrap()[4], 22);
        assert_eq!(decode(&mut scaled, 16), None);
    }

    #[test]
    fn test_mirror_reverses_rows() {
        let direct = numbered_rows();
        let mut mirror = Mirror::new(&direct, 20);

        let top = decode(&mut mirror, 20).unwrap();
        assert_eq!(top, [21, 21, 21, 21, 22, 22, 22, 22]);
        let bottom = decode(&mut mirror, 20 + 4 * 2 + 3).unwrap();
        assert_eq!(bottom, [1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(decode(&mut mirror, 20 + 4 * 3), None);
    }

    #[test]
    fn test_mirror_is_pure_row_reversal() {
        let direct = numbered_rows();
        let height = direct.height();
        let top_line = 7;
        let mut mirror = Mirror::new(&direct, top_line);
        let mut plain = Scaled::new(&direct, top_line, MIRROR_SCALE);

        for k in 0..height {
            for j in 0..MIRROR_SCALE {
                let mirrored = decode(&mut mirror, top_line + MIRROR_SCALE * k + j);
                for j2 in 0..MIRROR_SCALE {
                    let flipped = top_line + MIRROR_SCALE * (height - 1 - k) + j2;
                    assert_eq!(mirrored, decode(&mut plain, flipped));
                }
            }
        }
    }

    #[test]
    fn test_mirror_blanks_without_writing() {
        let direct = numbered_rows();
        let mut mirror = Mirror::new(&direct, 4);
        let mut target = [0x77u8; 8];
        for line in [0, 3, 16, 1000, usize::MAX] {
            assert!(mirror.rasterize(line, &mut target).is_empty());
        }
        assert_eq!(target, [0x77; 8]);
    }

    #[test]
    fn test_transforms_work_over_any_format() {
        let mut arena = test_arena(1024);
        let mut bitmap = Bitmap1::new(&mut arena, 8, 2);
        bitmap.set_colors(0, 1);
        bitmap.back_mut().copy_from_slice(&[0x80, 0x01]);
        bitmap.flip();

        let mut mirror = Mirror::with_scale(&bitmap, 0, 1);
        let mut target = [9u8; 8];
        assert_eq!(mirror.rasterize(0, &mut target).length, 8);
        assert_eq!(target, [0, 0, 0, 0, 0, 0, 0, 1]);
        mirror.rasterize(1, &mut target);
        assert_eq!(target, [1, 0, 0, 0, 0, 0, 0, 0]);
    }
}

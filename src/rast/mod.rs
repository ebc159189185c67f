//! # Rasterizers
//!
//! Turn a compact framebuffer into the bytes the output stage shifts out for
//! one scanline.
//!
//! Two layers:
//! - [`RowSource`]: format decoding. Knows how a stored row unpacks into
//!   pixels, knows nothing about which physical line is being drawn.
//! - [`Rasterizer`]: maps a physical line number to a stored row (or to
//!   blanking) and calls the decoder.
//!
//! Format rasterizers map line N to row N. Transforms ([`Scaled`], [`Mirror`])
//! borrow a `RowSource` and remap geometry only, so new effects never touch
//! the decoders.
//!
//! `rasterize` runs once per scanline under a hard deadline: it never
//! allocates, blocks or logs.

pub mod bitmap_1;
pub mod direct_4;
pub mod packed_4;
pub mod pages;
pub mod transform;
pub mod unpack;

pub use bitmap_1::Bitmap1;
pub use direct_4::Direct4;
pub use packed_4::Packed4;
pub use pages::Pages;
pub use transform::{Mirror, Scaled, Window, MIRROR_SCALE};

/// One output byte, in the encoding the output stage expects.
pub type Pixel = u8;

/// Where a computed line's payload sits in the target, and how long it is.
///
/// A zero length means "nothing to send": blanking or out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineShape {
    pub offset: usize,
    pub length: usize,
}

impl LineShape {
    pub const EMPTY: LineShape = LineShape {
        offset: 0,
        length: 0,
    };

    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

pub trait Rasterizer {
    /// Fills `target` for `line_number` and describes the result.
    ///
    /// Out-of-range lines, and targets too short for a full line, return
    /// [`LineShape::EMPTY`] without touching `target`.
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &mut R {
    fn rasterize(&mut self, line_number: usize, target: &mut [Pixel]) -> LineShape {
        (**self).rasterize(line_number, target)
    }
}

/// Format decoding for one stored row.
pub trait RowSource {
    /// Number of stored rows.
    fn rows(&self) -> usize;

    /// Output pixels produced per row.
    fn row_pixels(&self) -> usize;

    /// Unpacks `row` into `target`.
    ///
    /// Callers guarantee `row < self.rows()` and
    /// `target.len() == self.row_pixels()`.
    fn unpack_row(&self, row: usize, target: &mut [Pixel]);
}

/// Shared tail of every rasterizer: bounds check, then decode.
#[inline(always)]
pub fn rasterize_row<S: RowSource + ?Sized>(
    source: &S,
    row: Option<usize>,
    target: &mut [Pixel],
) -> LineShape {
    let width = source.row_pixels();
    match row {
        Some(row) if row < source.rows() && target.len() >= width => {
            source.unpack_row(row, &mut target[..width]);
            LineShape::new(0, width)
        }
        _ => LineShape::EMPTY,
    }
}

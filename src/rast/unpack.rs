//! Scanline unpack loops.
//!
//! These run inside the per-line deadline. With the `ramcode` feature they are
//! linked into `.ramcode`, which the firmware's linker script must map to
//! zero-wait-state RAM. Cost is linear in the output width and nothing else.

use super::Pixel;

/// Horizontal replication factor of the direct-colour format.
pub const DIRECT_SCALE: usize = 4;

/// 1 bpp, most significant bit first: bit 7 of `src[0]` is the leftmost pixel.
///
/// Each bit selects `palette[bit]`. Writes `target.len()` pixels; a final
/// partial byte only contributes its leading bits.
#[cfg_attr(feature = "ramcode", link_section = ".ramcode")]
#[inline(never)]
pub fn unpack_1bpp(src: &[u8], palette: [Pixel; 2], target: &mut [Pixel]) {
    for (chunk, &byte) in target.chunks_mut(8).zip(src) {
        for (bit, out) in chunk.iter_mut().enumerate() {
            *out = palette[((byte >> (7 - bit)) & 1) as usize];
        }
    }
}

/// 4 bpp, high nibble first. Each nibble selects `palette[nibble]`.
#[cfg_attr(feature = "ramcode", link_section = ".ramcode")]
#[inline(never)]
pub fn unpack_4bpp(src: &[u8], palette: &[Pixel; 16], target: &mut [Pixel]) {
    for (pair, &byte) in target.chunks_mut(2).zip(src) {
        pair[0] = palette[(byte >> 4) as usize];
        if let Some(low) = pair.get_mut(1) {
            *low = palette[(byte & 0x0F) as usize];
        }
    }
}

/// Direct colour, each source byte repeated [`DIRECT_SCALE`] times.
#[cfg_attr(feature = "ramcode", link_section = ".ramcode")]
#[inline(never)]
pub fn unpack_direct_x4(src: &[u8], target: &mut [Pixel]) {
    for (quad, &px) in target.chunks_exact_mut(DIRECT_SCALE).zip(src) {
        quad.fill(px);
    }
}

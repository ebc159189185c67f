//! Color representation and conversion to output bytes
use embedded_graphics_core::pixelcolor::{Rgb888, RgbColor};

use crate::rast::Pixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const GRAY: Color = Color::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Output byte for the resistor DAC: `0bBBGGGRRR`.
    pub const fn to_pixel(self) -> Pixel {
        (self.r >> 5) | ((self.g >> 5) << 3) | ((self.b >> 6) << 6)
    }

    /// Inverse of [`Color::to_pixel`], expanding each channel to 8 bits.
    pub const fn from_pixel(pixel: Pixel) -> Self {
        let r = pixel & 0b111;
        let g = (pixel >> 3) & 0b111;
        let b = pixel >> 6;
        Self {
            r: (r << 5) | (r << 2) | (r >> 1),
            g: (g << 5) | (g << 2) | (g >> 1),
            b: b * 0x55,
        }
    }

    pub fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

impl From<Rgb888> for Color {
    fn from(c: Rgb888) -> Self {
        Color::new(c.r(), c.g(), c.b())
    }
}

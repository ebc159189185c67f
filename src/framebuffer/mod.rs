//! # Framebuffer Drawing
//!
//! Lets `embedded-graphics` draw into the formats the rasterizers read.
//!
//! ## Modules
//!
//! - `color`: `Color` and its packing into output bytes
//! - `writer`: `DrawTarget` impls for `Bitmap1`, `Direct4` and `Packed4`, and
//!   [`Canvas`] for a framebuffer a transform is borrowing
//!
//! Drawing always lands on the back page. Nothing is visible until the format
//! is flipped, which the caller does during vertical blanking.

pub mod color;
pub mod writer;

pub use color::Color;
pub use writer::{Canvas, Surface};

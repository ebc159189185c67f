//! Scanline rasterization for a microcontroller-driven VGA signal.
//!
//! Startup builds an [`allocators::Arena`] from the board's region table,
//! framebuffers and modes are carved from it, and from then on the timing
//! generator calls [`mode::Mode::rasterize`] once per active line.
#![cfg_attr(not(test), no_std)]

pub mod allocators;
pub mod framebuffer;
pub mod memory;
pub mod mode;
pub mod rast;

pub use allocators::{Arena, ArenaError, Region};
pub use mode::{Mode, RasterMode, Timing};
pub use rast::{LineShape, Pixel, Rasterizer};

//! # Arena Allocator
//!
//! Permanent-allocation memory service built from a fixed, discontiguous
//! region table discovered at startup.
//!
//! - Bookkeeping (a RAM copy of the table) is carved from region 0
//! - Requests are rounded up to a 4-byte word
//! - First fit across regions, in table order
//! - Nothing is ever freed
//!
//! A request that no region can satisfy, or a table that cannot hold its own
//! bookkeeping, halts the system through [`fatal`].

mod arena;
mod core;

#[cfg(test)]
pub(crate) use arena::{leak_pool, test_arena};
pub use arena::{Arena, Region};
pub use self::core::{fatal, rounded_size, ArenaError, WORD_ALIGN};

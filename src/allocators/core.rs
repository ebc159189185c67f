/// Core utilities and error types for the arena
use core::fmt;

use log::error;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Natural allocation granule. Every request is rounded up to a multiple of this.
pub const WORD_ALIGN: usize = 4;

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Rounds `addr` up to `align`, or `None` if that overflows.
#[inline]
pub(crate) const fn align_up(addr: usize, align: usize) -> Option<usize> {
    match addr.checked_add(align - 1) {
        Some(sum) => Some(sum & !(align - 1)),
        None => None,
    }
}

#[inline]
pub(crate) fn is_aligned(addr: usize, align: usize) -> bool {
    addr & (align - 1) == 0
}

/// Size actually consumed by a request for `n` bytes: `ceil(n / 4) * 4`.
#[inline]
pub const fn rounded_size(n: usize) -> Option<usize> {
    align_up(n, WORD_ALIGN)
}

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    /// The region table has no entries.
    NoRegions,
    /// A region has `end < start`.
    InvalidRegion { index: usize },
    /// Region 0 cannot hold a `Region` record at its start address.
    Misaligned { start: usize },
    /// Region 0 is too small for the RAM copy of the table.
    BookkeepingTooSmall { needed: usize, available: usize },
    /// No region can satisfy the (rounded) request.
    OutOfMemory { requested: usize },
    /// `arena_reset` ran more than once.
    AlreadyInitialized,
    /// An allocation arrived before `arena_reset`.
    Uninitialized,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::NoRegions => write!(f, "region table is empty"),
            ArenaError::InvalidRegion { index } => {
                write!(f, "region {} ends before it starts", index)
            }
            ArenaError::Misaligned { start } => {
                write!(f, "region 0 start {:#x} is misaligned for bookkeeping", start)
            }
            ArenaError::BookkeepingTooSmall { needed, available } => write!(
                f,
                "region 0 holds {} bytes, bookkeeping needs {}",
                available, needed
            ),
            ArenaError::OutOfMemory { requested } => {
                write!(f, "out of memory allocating {} bytes", requested)
            }
            ArenaError::AlreadyInitialized => write!(f, "arena already reset"),
            ArenaError::Uninitialized => write!(f, "arena used before reset"),
        }
    }
}

/// Stops forward progress for good.
///
/// The firmware's panic handler parks the core, so this never continues.
#[cold]
#[inline(never)]
pub fn fatal(err: ArenaError) -> ! {
    error!("arena: {}", err);
    panic!("arena: {}", err)
}

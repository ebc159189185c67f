//! Process-wide arena and its boot-time plumbing.
//!
//! `arena_reset` must run exactly once, before anything allocates and before
//! the first scanline is rasterized. No lock protects the hand-off between
//! setup and rasterization beyond that ordering.
use bootloader_api::info::{MemoryRegion, MemoryRegionKind};
use core::alloc::{GlobalAlloc, Layout};
use core::ptr;
use log::{info, warn};
use spin::Mutex;

use crate::allocators::{fatal, Arena, ArenaError, Region};

pub struct ArenaHeap {
    inner: Mutex<Option<Arena>>,
}

impl ArenaHeap {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// # Safety
    ///
    /// See [`Arena::reset`].
    pub unsafe fn reset(&self, table: &[Region]) {
        if let Err(err) = self.try_reset(table) {
            fatal(err);
        }
    }

    /// # Safety
    ///
    /// See [`Arena::reset`].
    pub unsafe fn try_reset(&self, table: &[Region]) -> Result<(), ArenaError> {
        let mut guard = self.inner.lock();
        if guard.is_some() {
            return Err(ArenaError::AlreadyInitialized);
        }
        *guard = Some(Arena::try_reset(table)?);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Runs `f` against the arena, halting if it was never reset.
    pub fn with_arena<R>(&self, f: impl FnOnce(&mut Arena) -> R) -> R {
        let mut guard = self.inner.lock();
        match guard.as_mut() {
            Some(arena) => f(arena),
            None => fatal(ArenaError::Uninitialized),
        }
    }

    /// Zero until the arena is reset.
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().as_ref().map_or(0, Arena::total_bytes)
    }

    pub fn allocate(&self, n: usize) -> *mut u8 {
        self.with_arena(|arena| arena.allocate(n))
    }

    /// Null on failure, for allocator front ends that must not unwind.
    pub fn alloc_layout(&self, layout: Layout) -> *mut u8 {
        self.inner.lock().as_mut().map_or(ptr::null_mut(), |arena| {
            arena
                .try_allocate_aligned(layout.size(), layout.align())
                .unwrap_or(ptr::null_mut())
        })
    }
}

/// The single arena for the whole program.
pub static ARENA: ArenaHeap = ArenaHeap::new();

/// Builds [`ARENA`] from the boot-time region table.
///
/// # Safety
///
/// See [`Arena::reset`]. Halts if called twice.
pub unsafe fn arena_reset(table: &[Region]) {
    ARENA.reset(table);
}

pub fn allocate(n: usize) -> *mut u8 {
    ARENA.allocate(n)
}

/// Accepted and ignored.
pub fn release(_ptr: *mut u8) {}

pub fn arena_total_bytes() -> usize {
    ARENA.total_bytes()
}

/// `GlobalAlloc` front end for [`ARENA`]:
///
/// ```ignore
/// #[global_allocator]
/// static HEAP: vga_raster::memory::GlobalArena = vga_raster::memory::GlobalArena;
/// ```
///
/// Exhaustion returns null so the binary's `alloc_error_handler` halts.
pub struct GlobalArena;

unsafe impl GlobalAlloc for GlobalArena {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ARENA.alloc_layout(layout)
    }

    unsafe fn dealloc(&self, _ptr: *mut u8, _layout: Layout) {
        // Arena memory is never returned
    }
}

/// Collects the bootloader's `Usable` entries into `table`, in map order.
pub fn usable_regions<'t>(memory_map: &[MemoryRegion], table: &'t mut [Region]) -> &'t [Region] {
    let mut count = 0;
    for region in memory_map.iter().filter(|r| r.kind == MemoryRegionKind::Usable) {
        if count == table.len() {
            warn!(
                "memory: table full, dropping {:#x} - {:#x}",
                region.start, region.end
            );
            continue;
        }
        table[count] = Region::new(region.start as usize, region.end as usize);
        count += 1;
    }
    &table[..count]
}

pub fn log_regions(arena: &Arena) {
    info!("=== Arena Regions ===");
    for (i, region) in arena.regions().iter().enumerate() {
        info!(
            "  [{}] {:#018x} - {:#018x} ({:>8} bytes free)",
            i,
            region.start,
            region.end,
            region.size()
        );
    }
    info!(
        "Total: {} bytes, remaining: {} bytes",
        arena.total_bytes(),
        arena.remaining_bytes()
    );
}

use core::mem::{align_of, size_of};
use core::{ptr, slice};

use log::{debug, info, trace};

use super::core::{align_up, fatal, is_aligned, rounded_size, ArenaError, WORD_ALIGN};

// ============================================================================
// REGION
// ============================================================================

/// A contiguous span of usable memory, `[start, end)`.
///
/// Inside the arena, `start` is the cursor: it only ever moves towards `end`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Bytes left between the cursor and the end.
    pub const fn size(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_exhausted(&self) -> bool {
        self.start >= self.end
    }

    fn take_bytes(&mut self, n: usize) -> usize {
        let old_start = self.start;
        self.start += n;
        old_start
    }
}

// ============================================================================
// ARENA (first-fit across regions, never frees)
// ============================================================================

/// Permanent-allocation arena over a discontiguous set of regions.
///
/// The region table lives at the bottom of region 0, carved off by
/// [`Arena::reset`]. Regions are scanned in table order for every request and
/// capacity only ever shrinks, so a given table and request sequence always
/// produces the same addresses.
#[derive(Debug)]
pub struct Arena {
    regions: &'static mut [Region],
    total_bytes: usize,
}

impl Arena {
    /// Builds the arena from a read-only region table, halting on a bad table.
    ///
    /// # Safety
    ///
    /// Every region must be memory the caller owns exclusively for the rest of
    /// the program. Must be called once per table: a second call would rebuild
    /// from region 0 memory that is already handed out.
    pub unsafe fn reset(table: &[Region]) -> Arena {
        match Self::try_reset(table) {
            Ok(arena) => arena,
            Err(err) => fatal(err),
        }
    }

    /// Fallible form of [`Arena::reset`].
    ///
    /// # Safety
    ///
    /// Same contract as [`Arena::reset`].
    pub unsafe fn try_reset(table: &[Region]) -> Result<Arena, ArenaError> {
        let region_count = table.len();
        if region_count < 1 {
            return Err(ArenaError::NoRegions);
        }
        if let Some(index) = table.iter().position(|r| r.end < r.start) {
            return Err(ArenaError::InvalidRegion { index });
        }

        // Bookkeeping always comes out of region 0.
        let bookkeeping = region_count * size_of::<Region>();
        let first = table[0];
        if first.size() < bookkeeping {
            return Err(ArenaError::BookkeepingTooSmall {
                needed: bookkeeping,
                available: first.size(),
            });
        }
        if first.start == 0 || !is_aligned(first.start, align_of::<Region>()) {
            return Err(ArenaError::Misaligned { start: first.start });
        }

        // The table may itself sit in region 0, so copy with overlap allowed.
        let state = first.start as *mut Region;
        ptr::copy(table.as_ptr(), state, region_count);
        let regions = slice::from_raw_parts_mut(state, region_count);

        // Sized before the carve, never recomputed.
        let total_bytes = regions.iter().map(Region::size).sum();
        regions[0].start += bookkeeping;

        info!(
            "arena: {} regions, {} bytes total, {} bytes bookkeeping",
            region_count, total_bytes, bookkeeping
        );
        for (i, region) in regions.iter().enumerate() {
            debug!(
                "arena:   [{}] {:#010x} - {:#010x} ({} bytes free)",
                i,
                region.start,
                region.end,
                region.size()
            );
        }

        Ok(Arena {
            regions,
            total_bytes,
        })
    }

    /// Sum of all region sizes before the bookkeeping carve.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions[..]
    }

    pub fn remaining_bytes(&self) -> usize {
        self.regions.iter().map(Region::size).sum()
    }

    /// Takes `n` bytes, rounded up to a word, from the first region that fits.
    ///
    /// Halts if no region can satisfy the request.
    pub fn allocate(&mut self, n: usize) -> *mut u8 {
        match self.try_allocate(n) {
            Ok(p) => p,
            Err(err) => fatal(err),
        }
    }

    pub fn try_allocate(&mut self, n: usize) -> Result<*mut u8, ArenaError> {
        let bytes = rounded_size(n).ok_or(ArenaError::OutOfMemory { requested: n })?;

        for region in self.regions.iter_mut() {
            if region.size() >= bytes {
                let addr = region.take_bytes(bytes);
                trace!("arena: {} bytes at {:#x}", bytes, addr);
                return Ok(addr as *mut u8);
            }
        }

        Err(ArenaError::OutOfMemory { requested: bytes })
    }

    /// Like [`Arena::allocate`], but the returned address is a multiple of
    /// `align`. Padding is taken from the chosen region. Word-or-smaller
    /// alignments take exactly the same path as `allocate`.
    pub fn allocate_aligned(&mut self, n: usize, align: usize) -> *mut u8 {
        match self.try_allocate_aligned(n, align) {
            Ok(p) => p,
            Err(err) => fatal(err),
        }
    }

    pub fn try_allocate_aligned(&mut self, n: usize, align: usize) -> Result<*mut u8, ArenaError> {
        debug_assert!(align.is_power_of_two());
        if align <= WORD_ALIGN {
            return self.try_allocate(n);
        }

        let bytes = rounded_size(n).ok_or(ArenaError::OutOfMemory { requested: n })?;
        for region in self.regions.iter_mut() {
            let start = match align_up(region.start, align) {
                Some(start) if start <= region.end => start,
                _ => continue,
            };
            if region.end - start >= bytes {
                region.take_bytes(start - region.start);
                let addr = region.take_bytes(bytes);
                trace!("arena: {} bytes at {:#x} (align {})", bytes, addr, align);
                return Ok(addr as *mut u8);
            }
        }

        Err(ArenaError::OutOfMemory { requested: bytes })
    }

    /// Permanent slice of `len` copies of `fill`.
    pub fn alloc_slice<T: Copy>(&mut self, len: usize, fill: T) -> &'static mut [T] {
        let bytes = match size_of::<T>().checked_mul(len) {
            Some(bytes) => bytes,
            None => fatal(ArenaError::OutOfMemory {
                requested: usize::MAX,
            }),
        };
        let base = self.allocate_aligned(bytes, align_of::<T>()) as *mut T;
        // SAFETY: `base` points at `bytes` fresh, suitably aligned bytes that
        // nothing else will ever be handed.
        unsafe {
            for i in 0..len {
                base.add(i).write(fill);
            }
            slice::from_raw_parts_mut(base, len)
        }
    }

    /// Moves `value` into permanent arena storage.
    pub fn alloc_value<T>(&mut self, value: T) -> &'static mut T {
        let slot = self.allocate_aligned(size_of::<T>(), align_of::<T>()) as *mut T;
        // SAFETY: as in `alloc_slice`.
        unsafe {
            slot.write(value);
            &mut *slot
        }
    }

    /// Release is accepted and ignored: nothing returns to a region.
    pub fn release(&mut self, _ptr: *mut u8) {}
}

/// Leaks a zeroed, 8-aligned host buffer and returns its base address.
#[cfg(test)]
pub(crate) fn leak_pool(bytes: usize) -> usize {
    let words = vec![0u64; (bytes + 7) / 8].into_boxed_slice();
    Box::leak(words).as_mut_ptr() as usize
}

/// Single-region arena over a fresh host buffer.
#[cfg(test)]
pub(crate) fn test_arena(bytes: usize) -> Arena {
    let base = leak_pool(bytes);
    unsafe { Arena::reset(&[Region::new(base, base + bytes)]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: usize = size_of::<Region>();

    fn two_regions() -> (usize, Arena) {
        let base = leak_pool(256);
        let table = [Region::new(base, base + 64), Region::new(base + 100, base + 164)];
        (base, unsafe { Arena::reset(&table) })
    }

    #[test]
    fn test_reset_copies_table_and_carves_bookkeeping() {
        let (base, arena) = two_regions();

        assert_eq!(arena.total_bytes(), 128);
        assert_eq!(arena.region_count(), 2);
        assert_eq!(arena.regions()[0], Region::new(base + 2 * RECORD, base + 64));
        assert_eq!(arena.regions()[1], Region::new(base + 100, base + 164));
        assert_eq!(arena.regions()[0].size(), 64 - 2 * RECORD);

        // The RAM copy lives at the bottom of region 0.
        let copy = unsafe { slice::from_raw_parts(base as *const Region, 2) };
        assert_eq!(copy.as_ptr(), arena.regions().as_ptr());
    }

    #[test]
    fn test_first_fit_by_table_order() {
        let (base, mut arena) = two_regions();
        let bookkeeping = 2 * RECORD;

        let a = arena.allocate(10) as usize;
        assert_eq!(a, base + bookkeeping);
        assert_eq!(arena.regions()[0].size(), 64 - bookkeeping - 12);

        // 52 bytes no longer fit in region 0.
        let b = arena.allocate(50) as usize;
        assert_eq!(b, base + 100);
        assert_eq!(arena.regions()[1].size(), 64 - 52);

        // Back to region 0 for a small request.
        let c = arena.allocate(5) as usize;
        assert_eq!(c, base + bookkeeping + 12);
        assert_eq!(arena.regions()[0].size(), 64 - bookkeeping - 20);
        assert_eq!(arena.regions()[1].size(), 12);

        assert_eq!(arena.total_bytes(), 128);
    }

    #[test]
    fn test_rounding_consumes_whole_words() {
        let mut arena = test_arena(512);
        for n in 0..=17usize {
            let before = arena.remaining_bytes();
            arena.allocate(n);
            assert_eq!(before - arena.remaining_bytes(), (n + 3) / 4 * 4);
        }
    }

    #[test]
    fn test_zero_sized_request_consumes_nothing() {
        let mut arena = test_arena(64);
        let a = arena.allocate(0) as usize;
        let b = arena.allocate(0) as usize;
        assert_eq!(a, b);
        assert_eq!(a, arena.regions()[0].start);
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let requests = [7usize, 30, 1, 64, 3, 12];
        let offsets = || {
            let base = leak_pool(512);
            let table = [Region::new(base, base + 96), Region::new(base + 128, base + 512)];
            let mut arena = unsafe { Arena::reset(&table) };
            requests
                .iter()
                .map(|&n| arena.allocate(n) as usize - base)
                .collect::<Vec<_>>()
        };
        assert_eq!(offsets(), offsets());
    }

    #[test]
    fn test_capacity_is_monotonic() {
        let (_, mut arena) = two_regions();
        let total = arena.total_bytes();
        let mut last: Vec<usize> = arena.regions().iter().map(Region::size).collect();

        for n in [4usize, 9, 20, 1, 0, 8] {
            arena.allocate(n);
            let now: Vec<usize> = arena.regions().iter().map(Region::size).collect();
            assert!(now.iter().zip(&last).all(|(now, last)| now <= last));
            assert_eq!(arena.total_bytes(), total);
            last = now;
        }
    }

    #[test]
    fn test_exhaustion_after_fitting_requests() {
        let (base, mut arena) = two_regions();
        let capacity = arena.remaining_bytes();

        let a = arena.try_allocate(capacity - 64).unwrap() as usize;
        assert_eq!(a, base + 2 * RECORD);
        let b = arena.try_allocate(64).unwrap() as usize;
        assert_eq!(b, base + 100);

        assert_eq!(arena.try_allocate(1), Err(ArenaError::OutOfMemory { requested: 4 }));
        assert_eq!(arena.remaining_bytes(), 0);
        // Exhausted regions stay in the table.
        assert_eq!(arena.region_count(), 2);
        assert!(arena.regions().iter().all(Region::is_exhausted));
    }

    #[test]
    #[should_panic(expected = "out of memory")]
    fn test_allocate_halts_when_nothing_fits() {
        let mut arena = test_arena(64);
        arena.allocate(32);
        arena.allocate(32);
    }

    #[test]
    fn test_release_is_a_no_op() {
        let mut arena = test_arena(64);
        let p = arena.allocate(16);
        let remaining = arena.remaining_bytes();
        arena.release(p);
        assert_eq!(arena.remaining_bytes(), remaining);
        assert_ne!(arena.allocate(4), p);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert_eq!(unsafe { Arena::try_reset(&[]) }.unwrap_err(), ArenaError::NoRegions);
    }

    #[test]
    #[should_panic(expected = "region table is empty")]
    fn test_reset_halts_on_empty_table() {
        unsafe { Arena::reset(&[]) };
    }

    #[test]
    fn test_undersized_first_region_is_rejected() {
        let base = leak_pool(256);
        let table = [
            Region::new(base, base + RECORD),
            Region::new(base + 64, base + 256),
        ];
        assert_eq!(
            unsafe { Arena::try_reset(&table) }.unwrap_err(),
            ArenaError::BookkeepingTooSmall {
                needed: 2 * RECORD,
                available: RECORD
            }
        );
    }

    #[test]
    #[should_panic(expected = "bookkeeping needs")]
    fn test_reset_halts_on_undersized_first_region() {
        let base = leak_pool(256);
        let table = [
            Region::new(base, base + RECORD),
            Region::new(base + 64, base + 256),
        ];
        unsafe { Arena::reset(&table) };
    }

    #[test]
    fn test_inverted_region_is_rejected() {
        let base = leak_pool(64);
        let table = [Region::new(base, base + 64), Region::new(base + 8, base + 4)];
        assert_eq!(
            unsafe { Arena::try_reset(&table) }.unwrap_err(),
            ArenaError::InvalidRegion { index: 1 }
        );
    }

    #[test]
    fn test_typed_helpers_respect_alignment() {
        let mut arena = test_arena(256);
        arena.allocate(4);

        let words: &mut [u64] = arena.alloc_slice(3, 0xAAu64);
        assert_eq!(words.as_ptr() as usize % align_of::<u64>(), 0);
        assert_eq!(words, &[0xAA, 0xAA, 0xAA]);

        let value = arena.alloc_value(0x1234u32);
        assert_eq!(*value, 0x1234);
        assert_eq!(value as *mut u32 as usize % 4, 0);
    }
}

use core::slice;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::allocators::Arena;

/// Two arena-backed framebuffer pages.
///
/// Rasterizers read the front page; drawing goes to the back page and becomes
/// visible on [`Pages::flip`]. Flipping mid-frame tears, so callers flip
/// during vertical blanking.
///
/// `flip` and [`Pages::back_shared`] work through `&self`, so a framebuffer
/// can keep being drawn while a transform borrows it for scanout. Only one
/// context may draw at a time; scanout may read the front page meanwhile.
pub struct Pages {
    pages: [*mut u8; 2],
    page_bytes: usize,
    front: AtomicUsize,
}

// SAFETY: the two pages are arena memory owned by this value alone.
unsafe impl Send for Pages {}

impl Pages {
    pub fn new(arena: &mut Arena, page_bytes: usize) -> Self {
        Self {
            pages: [
                arena.alloc_slice(page_bytes, 0u8).as_mut_ptr(),
                arena.alloc_slice(page_bytes, 0u8).as_mut_ptr(),
            ],
            page_bytes,
            front: AtomicUsize::new(0),
        }
    }

    pub fn page_bytes(&self) -> usize {
        self.page_bytes
    }

    #[inline(always)]
    fn front_index(&self) -> usize {
        self.front.load(Ordering::Acquire)
    }

    #[inline(always)]
    fn page(&self, index: usize) -> &[u8] {
        // SAFETY: both pointers cover `page_bytes` arena bytes that live
        // forever. Writers through `&self` go through `back_shared`, whose
        // contract keeps them off any page a live shared slice points at.
        unsafe { slice::from_raw_parts(self.pages[index], self.page_bytes) }
    }

    #[inline(always)]
    pub fn front(&self) -> &[u8] {
        self.page(self.front_index())
    }

    pub fn back(&self) -> &[u8] {
        self.page(self.front_index() ^ 1)
    }

    pub fn back_mut(&mut self) -> &mut [u8] {
        // SAFETY: `&mut self` rules out every other slice of either page.
        unsafe { self.back_shared() }
    }

    /// The back page through a shared borrow, for drawing while a transform
    /// holds `&self` for scanout.
    ///
    /// # Safety
    ///
    /// The caller is the only context writing to these pages, holds no other
    /// slice of the back page (including one taken from `front` before the
    /// last flip), and drops the returned slice before the next
    /// [`Pages::flip`].
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn back_shared(&self) -> &mut [u8] {
        slice::from_raw_parts_mut(self.pages[self.front_index() ^ 1], self.page_bytes)
    }

    pub fn flip(&self) {
        self.front.fetch_xor(1, Ordering::AcqRel);
    }

    /// Starts the next frame from what is on screen now.
    pub fn copy_front_to_back(&mut self) {
        let front = self.front_index();
        // SAFETY: distinct arena allocations of `page_bytes` each, and
        // `&mut self` rules out any other slice of them.
        unsafe {
            core::ptr::copy_nonoverlapping(self.pages[front], self.pages[front ^ 1], self.page_bytes);
        }
    }
}

//! Fixed-capacity pool allocator.
//!
//! A [`FixedPool`] owns one backing buffer for its whole lifetime and hands out
//! variable-sized, aligned regions of it.
//!
//! # Algorithm
//!
//! - **Allocation**: scans the block ledger from the lowest offset for the
//!   first free block that can hold the request once its start is rounded up
//!   to the requested alignment (**first fit**). The block is split into an
//!   optional free padding block, the used block, and an optional free tail.
//! - **Deallocation**: finds the used block starting at the given address,
//!   marks it free and merges it with a free predecessor, then with a free
//!   successor, so that no two free blocks are ever adjacent.
//!
//! Requested alignments are raised to [`MAX_ALIGN`] and zero-sized requests
//! are served as one-byte requests.
//!
//! # Performance Characteristics
//!
//! - **Allocation**: O(n) where n is the number of blocks
//! - **Deallocation**: O(log n) lookup plus O(n) to remove merged records
//! - **Memory Overhead**: one ledger record per block, stored outside the
//!   buffer
//!
//! # Thread Safety
//!
//! The pool is `Send` but not `Sync`. It can be moved between threads but
//! requires external synchronization for concurrent access.

use alloc::vec::Vec;
use core::{alloc::Layout, cell::RefCell, fmt, ptr, ptr::NonNull};

use crate::{
    buffer::{BackingBuffer, MAX_ALIGN, PoolInitError},
    ledger::{Block, Ledger, PoolStats},
    resource::{AllocError, AllocSnafu, MemoryResource},
};

/// A fixed-capacity allocator over a single pre-sized buffer.
///
/// Pointers returned by [`allocate`](Self::allocate) borrow from the pool's
/// buffer; they must not be used after the pool is dropped.
pub struct FixedPool {
    buffer: BackingBuffer,
    ledger: RefCell<Ledger>,
}

impl FixedPool {
    /// Creates a pool with at least `capacity` bytes.
    ///
    /// The capacity is rounded up to a multiple of [`MAX_ALIGN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::new(1000).unwrap();
    /// assert_eq!(pool.capacity(), 1008);
    /// assert_eq!(pool.blocks().len(), 1);
    /// ```
    pub fn new(capacity: usize) -> Result<Self, PoolInitError> {
        let buffer = BackingBuffer::new(capacity)?;
        let ledger = Ledger::new(buffer.len());
        log::debug!(
            "created pool of {} bytes at {:#x}",
            buffer.len(),
            buffer.base_addr()
        );
        Ok(Self {
            buffer,
            ledger: RefCell::new(ledger),
        })
    }

    /// Returns the size of the backing buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if `ptr` points into the backing buffer.
    #[must_use]
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.buffer.contains(ptr)
    }

    /// Returns a snapshot of the block ledger, in ascending offset order.
    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        self.ledger.borrow().blocks().to_vec()
    }

    /// Returns a summary of the current block ledger.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.ledger.borrow().stats()
    }

    /// Allocates a region for `layout`.
    ///
    /// The returned address is a multiple of both `layout.align()` and
    /// [`MAX_ALIGN`], and is followed by at least `layout.size()` bytes not
    /// shared with any other live allocation. A zero-sized layout still
    /// consumes one byte.
    ///
    /// On failure the pool is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::alloc::Layout;
    ///
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::new(256).unwrap();
    /// let layout = Layout::from_size_align(200, 8).unwrap();
    ///
    /// let ptr = pool.allocate(layout).unwrap();
    /// assert!(pool.allocate(layout).is_err());
    ///
    /// pool.deallocate(ptr.as_ptr(), layout);
    /// assert!(pool.allocate(layout).is_ok());
    /// ```
    pub fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = layout.size().max(1);
        let align = layout.align().max(MAX_ALIGN);

        let mut ledger = self.ledger.borrow_mut();
        let Some(fit) = ledger.find_fit(self.buffer.base_addr(), size, align) else {
            log::debug!(
                "pool at {:#x} exhausted: {size} bytes aligned to {align} requested, \
                 largest free block is {} bytes",
                self.buffer.base_addr(),
                ledger.stats().largest_free_block,
            );
            return AllocSnafu {
                size: layout.size(),
                align: layout.align(),
            }
            .fail();
        };

        let offset = ledger.split(fit, size);
        debug_assert!(ledger.is_consistent(), "{ledger:?}");
        log::trace!(
            "allocated {size} bytes aligned to {align} at offset {offset} (padding {})",
            fit.padding
        );

        Ok(self.buffer.ptr_at(offset))
    }

    /// Returns a region to the pool.
    ///
    /// `ptr` is expected to come from [`allocate`](Self::allocate) on this
    /// pool. Null pointers, pointers outside of the buffer, and pointers that
    /// do not start a live allocation are ignored. This never panics, and
    /// `layout` is not consulted.
    pub fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        let Some(offset) = self.buffer.offset_of(ptr) else {
            log::debug!("ignored release of {ptr:p}: not within the pool");
            return;
        };
        let Ok(mut ledger) = self.ledger.try_borrow_mut() else {
            return;
        };

        match ledger.release(offset) {
            Some(release) => {
                debug_assert!(ledger.is_consistent(), "{ledger:?}");
                log::trace!(
                    "released {} bytes at offset {offset} (requested {}), free block now {:?}",
                    release.freed,
                    layout.size(),
                    release.coalesced.range(),
                );
            }
            None => log::debug!("ignored release of offset {offset}: no live allocation"),
        }
    }

    /// Returns `true` if `self` and `other` are the same pool.
    ///
    /// Distinct pools never share memory, even with identical capacities.
    #[must_use]
    pub fn is_equal(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl MemoryResource for FixedPool {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        Self::allocate(self, layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        Self::deallocate(self, ptr.as_ptr(), layout);
    }

    fn is_equal(&self, other: &Self) -> bool {
        Self::is_equal(self, other)
    }
}

impl PartialEq for FixedPool {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Eq for FixedPool {}

impl fmt::Debug for FixedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedPool")
            .field("base", &format_args!("{:#x}", self.buffer.base_addr()))
            .field("stats", &self.stats())
            .finish()
    }
}

impl Drop for FixedPool {
    fn drop(&mut self) {
        let stats = self.ledger.get_mut().stats();
        if stats.used_block_count > 0 {
            log::warn!(
                "dropping pool at {:#x} with {} live allocations ({} bytes)",
                self.buffer.base_addr(),
                stats.used_block_count,
                stats.used_bytes,
            );
        } else {
            log::debug!("dropping pool at {:#x}", self.buffer.base_addr());
        }
    }
}

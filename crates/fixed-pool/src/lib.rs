//! A fixed-capacity pool allocator.
//!
//! This crate provides [`FixedPool`], an allocator that obtains a single
//! buffer of fixed size once at construction and carves it into
//! variable-length, aligned regions on demand. Released regions are merged
//! with adjacent free regions immediately, so the pool never holds two free
//! blocks side by side.
//!
//! The crate is `no_std` and only needs the `alloc` crate for the backing
//! buffer and the block ledger.
//!
//! # Components
//!
//! - **Backing buffer**: one contiguous, [`MAX_ALIGN`]-aligned byte range,
//!   owned by the pool and freed when the pool is dropped. It never grows or
//!   shrinks.
//! - **Block ledger**: the ordered list of [`Block`]s partitioning the buffer,
//!   each tagged [`BlockState::Free`] or [`BlockState::Used`].
//! - **Allocator core**: first-fit search with alignment padding, splitting on
//!   allocation and coalescing on release.
//! - **[`MemoryResource`]**: the capability set (allocate, deallocate, identity
//!   comparison) that generic containers are parameterized over, with
//!   [`Global`] as the process-wide default.
//!
//! # Usage Examples
//!
//! ```rust
//! use core::alloc::Layout;
//!
//! use fixed_pool::FixedPool;
//!
//! let pool = FixedPool::new(1024).unwrap();
//!
//! let layout = Layout::from_size_align(100, 8).unwrap();
//! let p1 = pool.allocate(layout).unwrap();
//! let p2 = pool.allocate(layout).unwrap();
//!
//! // A released region is reused by the next request that fits.
//! pool.deallocate(p1.as_ptr(), layout);
//! let p3 = pool.allocate(layout).unwrap();
//! assert_eq!(p1, p3);
//!
//! pool.deallocate(p2.as_ptr(), layout);
//! pool.deallocate(p3.as_ptr(), layout);
//!
//! // Everything was released: the ledger is back to one free block.
//! let blocks = pool.blocks();
//! assert_eq!(blocks.len(), 1);
//! assert!(blocks[0].is_free());
//! assert_eq!(blocks[0].size(), pool.capacity());
//! ```
//!
//! # Design Considerations
//!
//! ## Memory Safety
//!
//! Pointers returned by the pool are raw views into its buffer. Users must
//! ensure:
//!
//! - no region is accessed after it has been deallocated or after the pool is
//!   dropped
//! - no more than the requested number of bytes is accessed
//!
//! Deallocating a pointer that does not start a live allocation of the pool
//! (null, foreign, already freed) is silently ignored. Double frees are
//! therefore not detected.
//!
//! ## Thread Safety
//!
//! [`FixedPool`] is `Send` but not `Sync`. It can be moved between threads but
//! requires external synchronization (e.g., a mutex) for concurrent access.
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `allocate` | O(n) in the number of blocks |
//! | `deallocate` | O(log n) lookup, O(n) record removal |
//! | `is_equal` | O(1) |

#![cfg_attr(not(test), no_std)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod buffer;
mod ledger;
mod pool;
mod resource;

pub use self::{
    buffer::{MAX_ALIGN, PoolInitError},
    ledger::{Block, BlockState, PoolStats},
    pool::FixedPool,
    resource::{AllocError, Global, MemoryResource},
};

//! A singly-linked list generic over its memory resource.
//!
//! [`ForwardList`] stores every element in its own node and obtains each node
//! from a [`MemoryResource`]. By default nodes come from [`Global`], the
//! process-wide allocator. Passing a reference to a
//! [`FixedPool`](fixed_pool::FixedPool) instead keeps all nodes inside the
//! pool's buffer, and every node is handed back to the pool when the element
//! is removed or the list is dropped.
//!
//! # Usage Examples
//!
//! ```rust
//! use fixed_pool::FixedPool;
//! use forward_list::ForwardList;
//!
//! let pool = FixedPool::new(4096).unwrap();
//! {
//!     let mut list = ForwardList::new_in(&pool);
//!     for i in 0..10 {
//!         list.push_front(i);
//!     }
//!     assert_eq!(list.front(), Some(&9));
//!     assert_eq!(pool.stats().used_block_count, 10);
//! }
//!
//! // Dropping the list released every node.
//! assert_eq!(pool.blocks().len(), 1);
//! ```
//!
//! A list without an explicit resource uses the global allocator:
//!
//! ```rust
//! use forward_list::ForwardList;
//!
//! let list = ["c", "b", "a"].into_iter().collect::<ForwardList<_>>();
//! assert!(list.iter().eq(["a", "b", "c"].iter()));
//! ```
//!
//! [`Global`]: fixed_pool::Global
//! [`MemoryResource`]: fixed_pool::MemoryResource

#![cfg_attr(not(test), no_std)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod iter;
mod list;

pub use self::{
    iter::{IntoIter, Iter, IterMut},
    list::ForwardList,
};

//! The capability set generic containers need from an allocator.
//!
//! [`MemoryResource`] is the minimal interface a container is parameterized
//! over: allocate a block for a [`Layout`], give it back, and tell whether two
//! resources can free each other's memory. It is implemented by
//! [`FixedPool`](crate::FixedPool), by [`Global`] (the process-wide allocator),
//! and by shared references to any resource.

use alloc::alloc::{alloc, dealloc};
use core::{alloc::Layout, ptr::NonNull};

use snafu::{OptionExt as _, Snafu};

/// The error returned when a resource cannot satisfy an allocation request.
///
/// The resource is left in the same state as before the failing call, so the
/// request can be retried once memory has been released.
#[derive(Debug, Snafu)]
#[snafu(display("out of memory: cannot allocate {size} bytes aligned to {align}"))]
#[snafu(visibility(pub(crate)))]
pub struct AllocError {
    size: usize,
    align: usize,
    #[snafu(implicit)]
    location: snafu::Location,
}

impl AllocError {
    /// Requested size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Requested alignment in bytes.
    #[must_use]
    pub fn align(&self) -> usize {
        self.align
    }

    /// Where the failure was detected.
    #[must_use]
    pub fn location(&self) -> &snafu::Location {
        &self.location
    }

    /// The layout of the failed request.
    #[must_use]
    pub fn layout(&self) -> Option<Layout> {
        Layout::from_size_align(self.size, self.align).ok()
    }
}

/// A source of memory blocks.
///
/// # Safety contract
///
/// A block returned by [`allocate`](Self::allocate) must be valid for reads
/// and writes of `layout.size()` bytes, aligned to `layout.align()`, and must
/// not overlap any other live block of the same resource until it is passed
/// back to [`deallocate`](Self::deallocate).
pub trait MemoryResource {
    /// Allocates a block for `layout`.
    ///
    /// Zero-sized requests still produce a distinct block that must be
    /// deallocated.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Returns a block to the resource.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`allocate`](Self::allocate) on a
    /// resource that [`is_equal`](Self::is_equal) to this one, with the same
    /// `layout`, and must not have been deallocated since.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Returns `true` if memory allocated from `self` can be deallocated
    /// through `other` and vice versa.
    fn is_equal(&self, other: &Self) -> bool;
}

impl<R> MemoryResource for &R
where
    R: MemoryResource + ?Sized,
{
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }

    fn is_equal(&self, other: &Self) -> bool {
        (**self).is_equal(*other)
    }
}

/// The process-wide general-purpose allocator.
///
/// All `Global` values front the same allocator, so they are always equal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Global;

impl Global {
    /// Zero-sized requests are served as one-byte requests.
    fn non_zero(layout: Layout) -> Option<Layout> {
        if layout.size() == 0 {
            Layout::from_size_align(1, layout.align()).ok()
        } else {
            Some(layout)
        }
    }
}

impl MemoryResource for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let context = AllocSnafu {
            size: layout.size(),
            align: layout.align(),
        };
        let layout = Self::non_zero(layout).context(context)?;
        NonNull::new(unsafe { alloc(layout) }).context(context)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Some(layout) = Self::non_zero(layout) {
            unsafe { dealloc(ptr.as_ptr(), layout) }
        }
    }

    fn is_equal(&self, _other: &Self) -> bool {
        true
    }
}

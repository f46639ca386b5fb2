//! The backing buffer of a [`FixedPool`](crate::FixedPool).
//!
//! A [`BackingBuffer`] is a single contiguous byte range obtained from the
//! global allocator exactly once, aligned to [`MAX_ALIGN`], and returned to
//! it exactly once when the buffer is dropped. It is never resized.

use alloc::alloc::{alloc, dealloc};
use core::{
    alloc::{Layout, LayoutError},
    ptr::NonNull,
};

use snafu::{OptionExt as _, ResultExt as _, Snafu, ensure};

/// The platform's maximum fundamental alignment.
///
/// Every allocation handed out by the pool is aligned to at least this value,
/// and the buffer capacity is rounded up to a multiple of it.
pub const MAX_ALIGN: usize = 16;

/// Errors that can occur when constructing a pool.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PoolInitError {
    #[snafu(display("pool capacity must be greater than zero"))]
    ZeroCapacity {
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("pool capacity {capacity} overflows when rounded up to {MAX_ALIGN}"))]
    CapacityOverflow {
        capacity: usize,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("pool capacity {capacity} does not form a valid layout"))]
    InvalidLayout {
        capacity: usize,
        #[snafu(implicit)]
        location: snafu::Location,
        source: LayoutError,
    },
    #[snafu(display("failed to obtain a backing buffer of {capacity} bytes"))]
    BufferUnavailable {
        capacity: usize,
        #[snafu(implicit)]
        location: snafu::Location,
    },
}

/// An owned, fixed-size, [`MAX_ALIGN`]-aligned byte range.
#[derive(Debug)]
pub(crate) struct BackingBuffer {
    base: NonNull<u8>,
    layout: Layout,
}

unsafe impl Send for BackingBuffer {}

impl BackingBuffer {
    /// Allocates a buffer of at least `capacity` bytes.
    ///
    /// The actual size is `capacity` rounded up to a multiple of
    /// [`MAX_ALIGN`].
    pub(crate) fn new(capacity: usize) -> Result<Self, PoolInitError> {
        ensure!(capacity > 0, ZeroCapacitySnafu);

        let size = capacity
            .checked_next_multiple_of(MAX_ALIGN)
            .context(CapacityOverflowSnafu { capacity })?;
        let layout =
            Layout::from_size_align(size, MAX_ALIGN).context(InvalidLayoutSnafu { capacity })?;

        let base = NonNull::new(unsafe { alloc(layout) })
            .context(BufferUnavailableSnafu { capacity })?;

        Ok(Self { base, layout })
    }

    /// Returns the size of the buffer in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Returns the address of the first byte of the buffer.
    pub(crate) fn base_addr(&self) -> usize {
        self.base.addr().get()
    }

    /// Returns `true` if `ptr` points into the buffer.
    pub(crate) fn contains(&self, ptr: *const u8) -> bool {
        self.offset_of(ptr).is_some()
    }

    /// Converts `ptr` into an offset from the start of the buffer.
    ///
    /// Returns `None` for null pointers and pointers outside of
    /// `base..base + len`.
    pub(crate) fn offset_of(&self, ptr: *const u8) -> Option<usize> {
        let offset = ptr.addr().checked_sub(self.base_addr())?;
        (offset < self.len()).then_some(offset)
    }

    /// Returns a pointer to the byte at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not within the buffer.
    pub(crate) fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        assert!(
            offset < self.len(),
            "offset {offset} out of buffer of {} bytes",
            self.len()
        );
        unsafe { self.base.add(offset) }
    }
}

impl Drop for BackingBuffer {
    fn drop(&mut self) {
        unsafe { dealloc(self.base.as_ptr(), self.layout) }
    }
}

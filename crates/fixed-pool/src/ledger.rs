//! Bookkeeping of the blocks that partition a pool's buffer.
//!
//! The [`Ledger`] stores every block of the buffer, free or used, as a record
//! in a vector sorted by offset. Splitting a block on allocation and merging
//! neighbours on release are insert/remove-at-index operations on that
//! vector.
//!
//! ```text
//!  offset 0                                                    total_size
//!  ┌──────────┬─────────┬──────────────────┬──────────┬───────────────────┐
//!  │ Used 100 │ Free 12 │ Used 100         │ Free 12  │ Free ... (merged) │
//!  └──────────┴─────────┴──────────────────┴──────────┴───────────────────┘
//!                ▲ alignment padding                  ▲ never two free
//!                                                       blocks side by side
//! ```
//!
//! After every operation the ledger upholds:
//!
//! - blocks are sorted by strictly increasing offset,
//! - blocks cover `0..total_size` with no gap and no overlap,
//! - no two adjacent blocks are both free,
//! - every block is at least one byte long.

use alloc::vec::Vec;
use core::ops::Range;

/// Whether a block is available for allocation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant,
)]
pub enum BlockState {
    #[display("free")]
    Free,
    #[display("used")]
    Used,
}

/// A contiguous sub-range of a pool's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    offset: usize,
    size: usize,
    state: BlockState,
}

impl Block {
    const fn new(offset: usize, size: usize, state: BlockState) -> Self {
        Self {
            offset,
            size,
            state,
        }
    }

    /// Offset of the first byte of the block, relative to the buffer start.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Size of the block in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Offset one past the last byte of the block.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    /// The byte range covered by the block.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    #[must_use]
    pub const fn state(&self) -> BlockState {
        self.state
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.state.is_free()
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.state.is_used()
    }
}

/// A summary of the ledger at one point in time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolStats {
    /// Total size of the buffer in bytes.
    pub capacity: usize,
    /// Bytes covered by used blocks.
    pub used_bytes: usize,
    /// Bytes covered by free blocks, alignment padding included.
    pub free_bytes: usize,
    /// Number of blocks in the ledger.
    pub block_count: usize,
    /// Number of used blocks, i.e. live allocations.
    pub used_block_count: usize,
    /// Number of free blocks.
    pub free_block_count: usize,
    /// Size of the largest free block, or zero if there is none.
    pub largest_free_block: usize,
}

/// Location in the ledger where a request can be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fit {
    /// Index of the free block the request is carved from.
    pub(crate) index: usize,
    /// Bytes skipped at the start of the block to honour the alignment.
    pub(crate) padding: usize,
}

/// Outcome of releasing a used block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Release {
    /// Size of the used block that was released.
    pub(crate) freed: usize,
    /// The free block the released block ended up in after coalescing.
    pub(crate) coalesced: Block,
}

/// Ordered partition of a buffer into free and used blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ledger {
    blocks: Vec<Block>,
    total_size: usize,
}

impl Ledger {
    /// Creates a ledger holding a single free block of `total_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `total_size` is zero.
    pub(crate) fn new(total_size: usize) -> Self {
        assert!(total_size > 0, "ledger must cover at least one byte");
        let mut blocks = Vec::new();
        blocks.push(Block::new(0, total_size, BlockState::Free));
        Self { blocks, total_size }
    }

    pub(crate) fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Searches for the first free block that can hold `size` bytes at an
    /// address that is a multiple of `align`.
    ///
    /// `base_addr` is the address of offset zero; alignment is computed on
    /// real addresses, not on offsets.
    ///
    /// The ledger is not modified.
    pub(crate) fn find_fit(&self, base_addr: usize, size: usize, align: usize) -> Option<Fit> {
        debug_assert!(align.is_power_of_two());
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_free())
            .find_map(|(index, block)| {
                let start = base_addr.checked_add(block.offset)?;
                let padding = start.checked_next_multiple_of(align)? - start;
                let needed = padding.checked_add(size)?;
                (needed <= block.size).then_some(Fit { index, padding })
            })
    }

    /// Carves a used block of `size` bytes out of the free block at
    /// `fit.index`, and returns its offset.
    ///
    /// The alignment padding in front of the used block stays a free block of
    /// its own, as does any space left after it.
    ///
    /// # Panics
    ///
    /// Panics if `fit` does not describe a free block large enough for
    /// `fit.padding + size` bytes.
    pub(crate) fn split(&mut self, fit: Fit, size: usize) -> usize {
        let Fit { index, padding } = fit;
        let block = self.blocks[index];
        assert!(block.is_free(), "cannot split a used block: {block:?}");
        assert!(
            size > 0 && padding + size <= block.size,
            "request of {padding}+{size} bytes does not fit in {block:?}"
        );

        let used_offset = block.offset + padding;
        let suffix = block.size - padding - size;

        let used_index = if padding > 0 {
            self.blocks[index].size = padding;
            self.blocks
                .insert(index + 1, Block::new(used_offset, size, BlockState::Used));
            index + 1
        } else {
            self.blocks[index] = Block::new(used_offset, size, BlockState::Used);
            index
        };

        if suffix > 0 {
            self.blocks.insert(
                used_index + 1,
                Block::new(used_offset + size, suffix, BlockState::Free),
            );
        }

        used_offset
    }

    /// Marks the used block starting at `offset` as free and merges it with
    /// its free neighbours, the preceding one first.
    ///
    /// Returns `None`, leaving the ledger untouched, if no used block starts
    /// at `offset`.
    pub(crate) fn release(&mut self, offset: usize) -> Option<Release> {
        let mut index = self
            .blocks
            .binary_search_by_key(&offset, |block| block.offset)
            .ok()?;
        if !self.blocks[index].is_used() {
            return None;
        }

        let freed = self.blocks[index].size;
        self.blocks[index].state = BlockState::Free;

        if index > 0 && self.blocks[index - 1].is_free() {
            let current = self.blocks.remove(index);
            index -= 1;
            self.blocks[index].size += current.size;
        }

        if self.blocks.get(index + 1).is_some_and(Block::is_free) {
            let next = self.blocks.remove(index + 1);
            self.blocks[index].size += next.size;
        }

        Some(Release {
            freed,
            coalesced: self.blocks[index],
        })
    }

    /// Checks every structural invariant of the ledger.
    pub(crate) fn is_consistent(&self) -> bool {
        let (Some(first), Some(last)) = (self.blocks.first(), self.blocks.last()) else {
            return false;
        };
        first.offset == 0
            && last.end() == self.total_size
            && self.blocks.iter().all(|block| block.size > 0)
            && self.blocks.windows(2).all(|pair| {
                pair[0].end() == pair[1].offset && !(pair[0].is_free() && pair[1].is_free())
            })
    }

    pub(crate) fn stats(&self) -> PoolStats {
        self.blocks.iter().fold(
            PoolStats {
                capacity: self.total_size,
                block_count: self.blocks.len(),
                ..PoolStats::default()
            },
            |mut stats, block| {
                match block.state {
                    BlockState::Free => {
                        stats.free_bytes += block.size;
                        stats.free_block_count += 1;
                        stats.largest_free_block = stats.largest_free_block.max(block.size);
                    }
                    BlockState::Used => {
                        stats.used_bytes += block.size;
                        stats.used_block_count += 1;
                    }
                }
                stats
            },
        )
    }
}

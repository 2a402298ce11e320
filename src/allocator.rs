use crate::constants::{stride, HEADER_SIZE, HEAP_SIZE, MAX_BLOCK_SIZE, MAX_PARTITIONS, NULL_OFFSET};
use crate::errors::{AllocError, InitError};
use crate::header::BlockHeader;
use crate::heap::Heap;
use crate::metrics::{PartitionMetrics, PoolMetrics};
use crate::partition::PartitionTable;
use log::{debug, trace};
use std::ptr::NonNull;

/// A fixed-capacity segregated block-pool allocator.
///
/// The heap is partitioned once, at init, into up to 255 size classes sorted
/// largest first; each class owns a contiguous run of equally sized blocks
/// threaded onto an intrusive LIFO free list. Allocation picks the smallest
/// non-empty class that fits and pops its head; free reads the 3-byte header
/// in front of the payload to find the owning class and pushes the block
/// back. Nothing is coalesced, split, or returned to the host allocator
/// until the pool itself is dropped.
#[derive(Debug)]
pub struct PoolAllocator {
    heap: Heap,
    table: PartitionTable,
}

impl PoolAllocator {
    /// Acquires the heap region and partitions it for the given block sizes.
    ///
    /// Sizes may be unsorted and may repeat; each entry becomes its own
    /// partition. Fails if the list is empty or longer than
    /// [`MAX_PARTITIONS`](crate::MAX_PARTITIONS), if any size is zero or
    /// exceeds [`MAX_BLOCK_SIZE`](crate::MAX_BLOCK_SIZE), or if the layout
    /// cannot give every class at least one block.
    pub fn new(block_sizes: &[usize]) -> Result<PoolAllocator, InitError> {
        let mut allocator = PoolAllocator {
            heap: Heap::new()?,
            table: PartitionTable::new(),
        };

        allocator.initialize(block_sizes)?;

        Ok(allocator)
    }

    /// Re-partitions the heap from scratch.
    ///
    /// Every pointer handed out before this call is invalidated, whether the
    /// call succeeds or not. After a failure the allocator is unusable
    /// (every `alloc` fails) until a later `initialize` succeeds.
    pub fn initialize(&mut self, block_sizes: &[usize]) -> Result<(), InitError> {
        self.table.clear();

        if block_sizes.is_empty() || block_sizes.len() > MAX_PARTITIONS {
            return Err(InitError::BadRequest);
        }

        for &size in block_sizes {
            if size == 0 || size > MAX_BLOCK_SIZE {
                return Err(InitError::BadRequest);
            }
        }

        self.table.fill_sorted(block_sizes);

        match self.layout_partitions() {
            Ok(()) => Ok(()),
            Err(err) => {
                // leave nothing allocatable behind a failed init
                self.table.clear();
                Err(err)
            }
        }
    }

    /// Walks the classes largest first, giving each an equal share of what
    /// remains rounded down to whole blocks, but never less than one block,
    /// and threads each partition's free list through the block headers.
    fn layout_partitions(&mut self) -> Result<(), InitError> {
        let count = self.table.len();
        let mut cursor = 0;
        let mut remaining = HEAP_SIZE;

        for i in 0..count {
            let block_size = self.table.get(i).block_size();
            let block_stride = stride(block_size);
            let equal_share = remaining / (count - i);
            let partition_bytes = block_stride.max(equal_share - equal_share % block_stride);

            if partition_bytes > remaining {
                return Err(InitError::OutOfSpace);
            }

            let upper_bound = cursor + partition_bytes;

            let partition = self.table.get_mut(i);
            partition.set_range(cursor, upper_bound);
            partition.set_free_head((cursor + HEADER_SIZE) as u16);

            let mut idx = cursor;
            while idx < upper_bound {
                let next = idx + block_stride + HEADER_SIZE;
                let next_free = if next < upper_bound && next <= u16::MAX as usize {
                    next as u16
                } else {
                    NULL_OFFSET
                };

                self.heap.write_header(idx, BlockHeader::new(next_free, i as u8));
                idx += block_stride;
            }

            trace!(
                "partition {}: block_size={} blocks={} offsets={}..{}",
                i,
                block_size,
                partition_bytes / block_stride,
                cursor,
                upper_bound
            );

            cursor = upper_bound;
            remaining = HEAP_SIZE - cursor;
        }

        debug!(
            "pool initialized: {} partitions, {} trailing bytes unpartitioned",
            count, remaining
        );

        Ok(())
    }

    /// Allocates `n` bytes from the smallest non-empty class that fits.
    ///
    /// Returns `BadRequest` for a zero-byte request or one larger than the
    /// largest class, and `OOM` once every class big enough is exhausted.
    /// The pointer stays valid until it is freed or the pool is
    /// re-initialized.
    pub fn alloc(&mut self, n: usize) -> Result<NonNull<u8>, AllocError> {
        if n == 0 || n > self.table.largest_block_size() {
            return Err(AllocError::BadRequest);
        }

        let index = self.table.select(n).ok_or(AllocError::OOM)?;
        let payload = self.table.get(index).free_head() as usize;

        let header = self.heap.read_header(payload - HEADER_SIZE);
        self.table.get_mut(index).set_free_head(header.next_free());

        // payload offsets start past the first header, never at 0
        unsafe { Ok(NonNull::new_unchecked(self.heap.at_offset(payload))) }
    }

    /// Returns a block to its owning partition's free list.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`alloc`](PoolAllocator::alloc) on
    /// this allocator, must not have been freed since, and the pool must not
    /// have been re-initialized in between. None of this is validated in
    /// release builds.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let payload = self.heap.offset_of(ptr.as_ptr());

        let mut header = self.heap.read_header(payload - HEADER_SIZE);
        let index = header.partition() as usize;

        debug_assert!(index < self.table.len());
        debug_assert!(self.table.get(index).owns_payload(payload));

        header.set_next_free(self.table.get(index).free_head());
        self.heap.write_header(payload - HEADER_SIZE, header);
        self.table.get_mut(index).set_free_head(payload as u16);
    }

    /// Number of active partitions. Zero only after a failed
    /// [`initialize`](PoolAllocator::initialize).
    pub fn partition_count(&self) -> usize {
        self.table.len()
    }

    /// Block size of the largest class, the upper bound on a single request.
    pub fn largest_block_size(&self) -> usize {
        self.table.largest_block_size()
    }

    /// Snapshots per-partition occupancy by walking the free lists.
    pub fn metrics(&self) -> PoolMetrics {
        let partitions = (0..self.table.len())
            .map(|i| {
                let partition = self.table.get(i);

                PartitionMetrics {
                    block_size: partition.block_size(),
                    capacity: partition.capacity(),
                    free_blocks: self.free_chain_len(i),
                }
            })
            .collect();

        PoolMetrics { partitions }
    }

    fn free_chain_len(&self, index: usize) -> usize {
        let mut count = 0;
        let mut offset = self.table.get(index).free_head();

        while offset != NULL_OFFSET {
            count += 1;
            offset = self
                .heap
                .read_header(offset as usize - HEADER_SIZE)
                .next_free();
        }

        count
    }
}

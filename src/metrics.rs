/// A point-in-time snapshot of pool occupancy.
///
/// Obtained by calling [`crate::PoolAllocator::metrics`]. Building the
/// snapshot walks every free list, so treat it as a cold-path diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolMetrics {
    /// One entry per partition, in heap order (largest block size first).
    pub partitions: Vec<PartitionMetrics>,
}

impl PoolMetrics {
    /// Total payload bytes currently sitting on free lists.
    pub fn free_bytes(&self) -> usize {
        self.partitions
            .iter()
            .map(|p| p.block_size * p.free_blocks)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionMetrics {
    /// Usable bytes per block, as originally requested.
    pub block_size: usize,

    /// Number of blocks laid out for this partition at init.
    pub capacity: usize,

    /// Number of blocks currently on the free list.
    pub free_blocks: usize,
}

use crate::constants::{stride, HEADER_SIZE, MAX_PARTITIONS, NULL_OFFSET};

/// One size class: a maximal run of equally sized blocks, contiguous in the
/// heap, with its own intrusive free list.
#[derive(Copy, Clone, Debug)]
pub struct Partition {
    block_size: usize,
    free_head: u16,
    start: usize,
    end: usize,
}

impl Partition {
    pub fn new(block_size: usize) -> Self {
        Partition {
            block_size,
            free_head: NULL_OFFSET,
            start: 0,
            end: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn free_head(&self) -> u16 {
        self.free_head
    }

    pub fn set_free_head(&mut self, offset: u16) {
        self.free_head = offset;
    }

    pub fn is_exhausted(&self) -> bool {
        self.free_head == NULL_OFFSET
    }

    pub fn set_range(&mut self, start: usize, end: usize) {
        self.start = start;
        self.end = end;
    }

    /// Number of blocks laid out for this partition.
    pub fn capacity(&self) -> usize {
        (self.end - self.start) / stride(self.block_size)
    }

    /// Whether `payload` is the payload offset of one of this partition's
    /// blocks. Only used by debug assertions in the free path.
    pub fn owns_payload(&self, payload: usize) -> bool {
        let first = self.start + HEADER_SIZE;

        payload >= first
            && payload < self.end
            && (payload - first) % stride(self.block_size) == 0
    }
}

/// The side table: one entry per declared size class, ordered largest block
/// size first, which is also partition order in the heap.
#[derive(Debug)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
}

impl PartitionTable {
    pub fn new() -> Self {
        PartitionTable {
            partitions: Vec::with_capacity(MAX_PARTITIONS),
        }
    }

    /// Refills the table with the given sizes sorted descending. Duplicates
    /// are preserved; heads stay exhausted until the layout walk threads
    /// each free list.
    pub fn fill_sorted(&mut self, block_sizes: &[usize]) {
        self.partitions.clear();

        for &size in block_sizes {
            self.partitions.push(Partition::new(size));
        }

        // sort on the real usize key, largest class first
        self.partitions
            .sort_unstable_by(|a, b| b.block_size.cmp(&a.block_size));
    }

    pub fn clear(&mut self) {
        self.partitions.clear();
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn get(&self, index: usize) -> &Partition {
        &self.partitions[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Partition {
        &mut self.partitions[index]
    }

    pub fn largest_block_size(&self) -> usize {
        self.partitions.first().map(|p| p.block_size).unwrap_or(0)
    }

    /// Best fit among non-empty classes: scanning smallest size first, picks
    /// the first partition whose blocks fit `n` and whose free list still
    /// has an entry. A request spills to a larger class when the tightest
    /// fit is exhausted.
    pub fn select(&self, n: usize) -> Option<usize> {
        for i in (0..self.partitions.len()).rev() {
            let partition = &self.partitions[i];

            if partition.block_size >= n && !partition.is_exhausted() {
                return Some(i);
            }
        }

        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_heads(sizes: &[usize]) -> PartitionTable {
        let mut table = PartitionTable::new();
        table.fill_sorted(sizes);

        // thread fake heads so select() sees every class as available
        for i in 0..table.len() {
            table.get_mut(i).set_free_head(3);
        }

        table
    }

    #[test]
    fn sorts_descending_with_duplicates() {
        let mut table = PartitionTable::new();
        table.fill_sorted(&[34, 12, 23, 12, 105]);

        let sizes: Vec<usize> = table.iter().map(|p| p.block_size()).collect();

        assert_eq!(sizes, vec![105, 34, 23, 12, 12]);
    }

    #[test]
    fn selects_tightest_fit() {
        let table = table_with_heads(&[1, 2, 6]);

        let index = table.select(2).unwrap();

        assert_eq!(table.get(index).block_size(), 2);
    }

    #[test]
    fn spills_to_larger_class_when_exhausted() {
        let mut table = table_with_heads(&[1, 2, 6]);

        // exhaust the size-2 class
        let tight = table.select(2).unwrap();
        table.get_mut(tight).set_free_head(NULL_OFFSET);

        let index = table.select(2).unwrap();

        assert_eq!(table.get(index).block_size(), 6);
    }

    #[test]
    fn rejects_oversized_requests() {
        let table = table_with_heads(&[8, 4]);

        assert!(table.select(9).is_none());
    }

    #[test]
    fn payload_ownership_is_stride_aligned() {
        let mut partition = Partition::new(4);
        partition.set_range(0, 28);

        assert!(partition.owns_payload(3));
        assert!(partition.owns_payload(10));
        assert!(!partition.owns_payload(4));
        assert!(!partition.owns_payload(28));
    }
}

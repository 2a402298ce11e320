use crate::constants::HEADER_SIZE;

/// The in-band metadata record at the start of every block.
///
/// `next_free` holds the payload offset of the next free block in the same
/// partition, or 0 at the end of the chain. `partition` is written at init
/// and never changes for the lifetime of the layout.
#[repr(C, packed)]
#[derive(Copy, Clone)]
pub struct BlockHeader {
    next_free: u16,
    partition: u8,
}

// All offset arithmetic assumes the header occupies exactly HEADER_SIZE
// bytes of the heap image.
const _: () = assert!(std::mem::size_of::<BlockHeader>() == HEADER_SIZE);

impl BlockHeader {
    pub fn new(next_free: u16, partition: u8) -> Self {
        BlockHeader {
            next_free,
            partition,
        }
    }

    pub fn next_free(&self) -> u16 {
        self.next_free
    }

    pub fn set_next_free(&mut self, next_free: u16) {
        self.next_free = next_free;
    }

    pub fn partition(&self) -> u8 {
        self.partition
    }
}

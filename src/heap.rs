use crate::constants::{HEADER_SIZE, HEAP_SIZE};
use crate::errors::HeapError;
use crate::header::BlockHeader;
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// The fixed backing region. Acquired from the host allocator once at
/// construction and released on drop; every address inside it is expressed
/// as a byte offset from the base.
#[derive(Debug)]
pub struct Heap {
    ptr: NonNull<u8>,
    layout: Layout,
}

// The region is exclusively owned; the only aliases are the payload pointers
// the allocator hands out, and those follow the allocator across threads.
unsafe impl Send for Heap {}

impl Heap {
    pub fn new() -> Result<Heap, HeapError> {
        unsafe {
            let layout = Layout::from_size_align_unchecked(HEAP_SIZE, 8);
            let ptr = alloc(layout);

            if ptr.is_null() {
                Err(HeapError::OOM)
            } else {
                Ok(Heap {
                    ptr: NonNull::new_unchecked(ptr),
                    layout,
                })
            }
        }
    }

    pub fn at_offset(&self, offset: usize) -> *mut u8 {
        assert!(offset < HEAP_SIZE);

        unsafe { self.ptr.as_ptr().add(offset) }
    }

    pub fn offset_of(&self, ptr: *const u8) -> usize {
        let offset = ptr as usize - self.ptr.as_ptr() as usize;
        debug_assert!(offset < HEAP_SIZE);

        offset
    }

    // BlockHeader is align 1, so plain reads and writes are fine at any
    // header offset.
    pub fn read_header(&self, header_offset: usize) -> BlockHeader {
        debug_assert!(header_offset + HEADER_SIZE <= HEAP_SIZE);

        unsafe { (self.at_offset(header_offset) as *const BlockHeader).read() }
    }

    pub fn write_header(&mut self, header_offset: usize, header: BlockHeader) {
        debug_assert!(header_offset + HEADER_SIZE <= HEAP_SIZE);

        unsafe { (self.at_offset(header_offset) as *mut BlockHeader).write(header) }
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

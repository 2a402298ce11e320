//! A fixed-capacity segregated block-pool allocator.
//!
//! A [`PoolAllocator`] owns a 65 536-byte heap region and partitions it once,
//! at init, into the block sizes the caller declares. Every allocation is
//! served whole from one of those partitions and every free returns the
//! block to its partition, so allocate and free run in deterministic bounded
//! time with no recourse to the host allocator: the behavior wanted in
//! constrained or real-time environments.
//! ```rust
//! use blockpool::PoolAllocator;
//!
//! // Three size classes; the layout gives each an equal share of the heap.
//! let mut pool = PoolAllocator::new(&[256, 64, 16]).unwrap();
//!
//! let ptr = pool.alloc(48).unwrap();
//!
//! unsafe {
//!     ptr.as_ptr().write(7);
//!     assert_eq!(ptr.as_ptr().read(), 7);
//!
//!     // Returns the block to the size-64 class it came from.
//!     pool.free(ptr);
//! }
//! ```
//!
//! Requests are matched to the smallest class that fits. When that class is
//! exhausted the request spills to the next larger one rather than failing,
//! trading internal fragmentation for availability:
//! ```rust
//! use blockpool::PoolAllocator;
//!
//! let mut pool = PoolAllocator::new(&[1, 2, 6]).unwrap();
//!
//! // No class of exactly 4 bytes exists; the size-6 class serves it.
//! assert!(pool.alloc(4).is_ok());
//! ```
//!
//! There is no coalescing, no splitting, and no resizing; a block's size
//! class is fixed for the lifetime of the layout. Re-initializing the pool
//! re-partitions from scratch and invalidates all outstanding pointers.

mod allocator;
mod constants;
mod errors;
mod header;
mod heap;
mod metrics;
mod partition;

pub use allocator::PoolAllocator;
pub use constants::{HEADER_SIZE, HEAP_SIZE, MAX_BLOCK_SIZE, MAX_PARTITIONS};
pub use errors::{AllocError, InitError};
pub use metrics::{PartitionMetrics, PoolMetrics};

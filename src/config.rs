//! Allocator tunables.
//!
//! Kept as a dedicated module of `const`s rather than scattered through the
//! algorithm. None of these are runtime-configurable: the allocator has no
//! config file and no persisted state.

/// Alignment grain every payload is rounded up to. The only alignment this
/// allocator supports.
pub const ALIGN: usize = 8;

/// Smallest payload-area size a block can have: enough to hold the two
/// free-list pointers when the block is free.
pub const MIN_PAYLOAD: usize = 16;

/// Header + footer + minimum payload, the smallest total size a contiguous
/// block can occupy. Used by the split test in `placement::split`.
pub const MIN_BLOCK_TOTAL: usize = 8 + 8 + MIN_PAYLOAD;

/// Number of segregated free-list buckets.
pub const BUCKET_COUNT: usize = 8;

/// Inclusive upper bound on payload size for each bucket below the last.
/// Bucket `BUCKET_COUNT - 1` (index 7) catches everything above 1024,
/// including mapped-origin allocations and large coalesced blocks.
pub const BUCKET_BOUNDS: [usize; BUCKET_COUNT - 1] = [16, 32, 64, 128, 256, 512, 1024];

/// Requests whose rounded payload size is at most this many bytes are
/// served from the contiguous arena; larger requests are `mmap`ed directly.
pub const MAX_CONTIGUOUS_PAYLOAD: usize = 1024;

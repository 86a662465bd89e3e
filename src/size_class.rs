//! Mapping from a requested payload size to a segregated-list bucket index.

use crate::config::{ALIGN, BUCKET_BOUNDS, BUCKET_COUNT, MIN_PAYLOAD};

/// Round `size` up to `max(MIN_PAYLOAD, next multiple of ALIGN)`.
#[inline]
pub fn round_up(size: usize) -> usize {
    let aligned = (size + (ALIGN - 1)) & !(ALIGN - 1);
    aligned.max(MIN_PAYLOAD)
}

/// Classify an already-rounded payload size into a bucket index in
/// `0..BUCKET_COUNT`. Total and monotonic in `size`.
#[inline]
pub fn classify(size: usize) -> usize {
    for (i, &bound) in BUCKET_BOUNDS.iter().enumerate() {
        if size <= bound {
            return i;
        }
    }
    BUCKET_COUNT - 1
}

//! Split (shrink a free block to the requested size, free the remainder)
//! and coalesce (merge a freed block with free neighbors in the contiguous
//! arena). These are the two operations that keep the free-list and
//! boundary-tag invariants intact across allocate/free.

use crate::block::Block;
use crate::config::MIN_BLOCK_TOTAL;
use crate::freelist::Buckets;

/// Split contiguous free block `block` (payload size `F`) into a left part
/// of payload size `target`, returned unlinked and ready to be marked
/// allocated, and a right remainder of payload size `F - target - 16`
/// inserted into `buckets`.
///
/// Caller must already have removed `block` from `buckets` and must only
/// call this when `block.payload_size() >= target + MIN_BLOCK_TOTAL`.
///
/// # Safety
/// `block` must be a valid, contiguous-origin (non-mapped) free block.
pub unsafe fn split(block: Block, target: usize, buckets: &mut Buckets) -> Block {
    let original = block.payload_size();
    debug_assert!(!block.is_mapped());
    debug_assert!(original >= target + MIN_BLOCK_TOTAL);

    let right_payload = original - target - 16;
    unsafe {
        block.set_payload_size(target);
        let right = Block(block.footer_ptr().add(1) as *mut u8);
        right.init(right_payload, false, false);
        buckets.insert(right);
    }
    block
}

/// Coalesce a just-freed contiguous block with its live neighbors in the
/// arena, covering all four cases (neither/next-only/prev-only/both free).
/// Any free neighbor absorbed is first unlinked from `buckets`; the merged
/// block is returned unlinked, ready for the caller to insert into its
/// (possibly different) bucket.
///
/// # Safety
/// `block` must be a freed, contiguous-origin block whose header/footer are
/// already written with A=0. `arena_start`/`arena_end` must bound the live
/// contiguous arena.
pub unsafe fn coalesce(
    mut block: Block,
    arena_start: *mut u8,
    arena_end: *mut u8,
    buckets: &mut Buckets,
) -> Block {
    unsafe {
        if let Some(next) = block.next_in_arena(arena_end) {
            if !next.is_allocated() {
                buckets.remove(next);
                let merged = block.payload_size() + next.payload_size() + 16;
                block.set_payload_size(merged);
            }
        }
        if let Some(prev) = block.prev_in_arena(arena_start) {
            if !prev.is_allocated() {
                buckets.remove(prev);
                let merged = prev.payload_size() + block.payload_size() + 16;
                prev.set_payload_size(merged);
                block = prev;
            }
        }
    }
    block
}

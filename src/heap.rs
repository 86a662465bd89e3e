//! The allocator core: ties size classing, the free-list buckets, the
//! arena/mmap backends and the split/coalesce placement policy into
//! `allocate` and `free`, the two block-management operations. Crate-private
//! — the only way to reach a `Heap` from outside this crate is through the
//! process-wide singleton driven by the public API in `api`, which also
//! carries the argument validation and the calloc/realloc compositions that
//! sit above these two core operations.

use std::ptr;

use crate::arena::{self, Origin};
use crate::block::Block;
use crate::config::MIN_BLOCK_TOTAL;
use crate::error::fatal;
use crate::freelist::Buckets;
use crate::size_class::round_up;

pub(crate) struct Heap {
    buckets: Buckets,
    arena_start: *mut u8,
    arena_end: *mut u8,
}

impl Heap {
    pub const fn new() -> Self {
        Heap {
            buckets: Buckets::new(),
            arena_start: ptr::null_mut(),
            arena_end: ptr::null_mut(),
        }
    }

    fn has_arena(&self) -> bool {
        !self.arena_start.is_null()
    }

    /// Acquire a fresh free block for a `round_up`ped payload size of
    /// `size`, recording arena bounds on first use, and insert it into its
    /// bucket (contiguous blocks only — mapped blocks are handed straight
    /// to the caller by `allocate`, never linked).
    fn new_free_block(&mut self, size: usize) -> Block {
        let acquired = arena::acquire(size);
        match acquired.origin {
            Origin::Contiguous => {
                if !self.has_arena() {
                    self.arena_start = acquired.ptr;
                }
                self.arena_end = unsafe { acquired.ptr.add(acquired.len) };

                let block = Block(acquired.ptr);
                unsafe {
                    block.init(size, false, false);
                    self.buckets.insert(block);
                }
                block
            }
            Origin::Mapped => {
                let block = Block(acquired.ptr);
                unsafe { block.init(size, false, true) };
                block
            }
        }
    }

    /// Allocate `size` bytes, returning a payload pointer aligned to 8
    /// bytes with a payload area of at least `round_up(size)` bytes.
    ///
    /// `size` must be nonzero; the `api` module validates this before
    /// calling in.
    pub fn allocate(&mut self, size: usize) -> *mut u8 {
        debug_assert!(size > 0, "api module must reject size == 0 before calling in");
        let target = round_up(size);

        let candidate = match self.buckets.find_fit(target) {
            Some(block) => {
                unsafe { self.buckets.remove(block) };
                block
            }
            None => {
                let block = self.new_free_block(target);
                if !block.is_mapped() {
                    unsafe { self.buckets.remove(block) };
                }
                block
            }
        };

        let candidate = if !candidate.is_mapped()
            && candidate.payload_size() >= target + MIN_BLOCK_TOTAL
        {
            unsafe { crate::placement::split(candidate, target, &mut self.buckets) }
        } else {
            candidate
        };

        unsafe { candidate.set_allocated(true) };
        candidate.payload_ptr()
    }

    /// Free a previously allocated payload pointer.
    ///
    /// `ptr` must be non-null; the `api` module validates this before
    /// calling in. The `A=1` assertion stays here rather than in `api`: it
    /// is the free algorithm's own first step, a structural invariant check
    /// on the recovered block, not a caller-argument validation.
    pub fn free(&mut self, ptr: *mut u8) {
        debug_assert!(!ptr.is_null(), "api module must reject a null pointer before calling in");
        let block = Block::from_payload(ptr);
        if !block.is_allocated() {
            fatal("free called on a block that is not allocated");
        }

        if block.is_mapped() {
            let len = map_len_for_payload(block.payload_size());
            arena::unmap(block.0, len);
            return;
        }

        unsafe { block.set_allocated(false) };
        let merged =
            unsafe { crate::placement::coalesce(block, self.arena_start, self.arena_end, &mut self.buckets) };
        unsafe { self.buckets.insert(merged) };
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

fn map_len_for_payload(payload_size: usize) -> usize {
    let page = crate::arena::page_size();
    let n = payload_size + 8;
    (n + page - 1) & !(page - 1)
}

#[cfg(test)]
impl Heap {
    /// Test-only: walk the contiguous arena from `arena_start` to
    /// `arena_end`, yielding every block in address order.
    fn walk_arena(&self) -> Vec<Block> {
        let mut blocks = Vec::new();
        if !self.has_arena() {
            return blocks;
        }
        let mut cur = Some(Block(self.arena_start));
        while let Some(block) = cur {
            blocks.push(block);
            cur = unsafe { block.next_in_arena(self.arena_end) };
        }
        blocks
    }

    /// Test-only mirror of the `api` module's realloc composition, so these
    /// tests can exercise allocate-then-free sequencing against a private
    /// `Heap` without going through the real process-wide singleton.
    fn test_reallocate(&mut self, ptr: *mut u8, size: usize) -> *mut u8 {
        if ptr.is_null() {
            return if size == 0 { ptr::null_mut() } else { self.allocate(size) };
        }
        if size == 0 {
            self.free(ptr);
            return ptr::null_mut();
        }
        let old_size = Block::from_payload(ptr).payload_size();
        let new_ptr = self.allocate(size);
        unsafe { ptr::copy_nonoverlapping(ptr, new_ptr, old_size.min(size)) };
        self.free(ptr);
        new_ptr
    }
}


/// Property tests (P1-P7) driven by `quickcheck` over a small operation
/// sequence, each run against a fresh `Heap` so no test shares state with
/// another. Still serialized through the shared arena lock since the
/// backing `sbrk`/`mmap` calls are process-global.
#[cfg(test)]
mod properties {
    use super::*;
    use crate::size_class::{classify, round_up};
    use crate::utils::test_lock::guard;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    #[derive(Clone, Debug)]
    enum Op {
        Alloc(usize),
        Free(usize),
        Realloc(usize, usize),
    }

    impl Arbitrary for Op {
        fn arbitrary(g: &mut Gen) -> Op {
            let size = 1 + usize::arbitrary(g) % 2048;
            match u8::arbitrary(g) % 3 {
                0 => Op::Alloc(size),
                1 => Op::Free(usize::arbitrary(g)),
                _ => Op::Realloc(usize::arbitrary(g), size),
            }
        }
    }

    /// Run a sequence of ops against a fresh heap, tracking live allocations
    /// by index so `Free`/`Realloc` pick an existing (or a past, already
    /// freed) pointer deterministically from the recorded history.
    fn run(ops: &[Op]) -> (Heap, Vec<*mut u8>) {
        let mut heap = Heap::new();
        let mut live: Vec<*mut u8> = Vec::new();
        for op in ops {
            match *op {
                Op::Alloc(size) => live.push(heap.allocate(size)),
                Op::Free(idx) => {
                    if !live.is_empty() {
                        let i = idx % live.len();
                        let p = live.remove(i);
                        heap.free(p);
                    }
                }
                Op::Realloc(idx, size) => {
                    if !live.is_empty() {
                        let i = idx % live.len();
                        let p = live[i];
                        live[i] = heap.test_reallocate(p, size);
                    }
                }
            }
        }
        (heap, live)
    }

    #[quickcheck]
    fn p1_p2_p3_p4_arena_invariants(ops: Vec<Op>) -> bool {
        let _g = guard();
        let ops: Vec<Op> = ops.into_iter().take(64).collect();
        let (heap, _live) = run(&ops);

        let blocks = heap.walk_arena();
        for w in blocks.windows(2) {
            if !w[0].is_allocated() && !w[1].is_allocated() {
                return false; // P1: no two adjacent free blocks
            }
        }
        for block in &blocks {
            // P2
            if unsafe { block.header() } != unsafe { block.footer_ptr().read() } {
                return false;
            }
            // P3
            if block.payload_size() % 8 != 0 || block.payload_size() < 16 {
                return false;
            }
            // P4
            if !block.is_allocated() {
                let bucket = classify(block.payload_size());
                if !heap.buckets.bucket_contains(bucket, *block) {
                    return false;
                }
            }
        }
        true
    }

    #[quickcheck]
    fn p5_allocate_returns_large_enough_aligned_pointer(size: usize) -> bool {
        let _g = guard();
        let size = 1 + size % 4096;
        let mut heap = Heap::new();
        let p = heap.allocate(size);
        let block = Block::from_payload(p);
        let ok = block.payload_size() >= round_up(size) && (p as usize) % 8 == 0;
        heap.free(p);
        ok
    }

    #[quickcheck]
    fn p6_alloc_then_free_never_shrinks_total_free_bytes(size: usize) -> bool {
        let _g = guard();
        let size = 1 + size % 1024;
        let mut heap = Heap::new();
        // Seed one free block so the arena exists and has a baseline to compare.
        let seed = heap.allocate(16);
        heap.free(seed);
        let before = heap.buckets.total_free_payload();

        let p = heap.allocate(size);
        heap.free(p);
        let after = heap.buckets.total_free_payload();

        after >= before
    }

    #[quickcheck]
    fn p7_reallocate_preserves_common_prefix(old_size: usize, new_size: usize) -> bool {
        let _g = guard();
        let old_size = 1 + old_size % 2048;
        let new_size = 1 + new_size % 2048;
        let mut heap = Heap::new();

        let p = heap.allocate(old_size);
        unsafe { ptr::write_bytes(p, 0x42, old_size) };
        let new_p = heap.test_reallocate(p, new_size);

        let common = old_size.min(new_size);
        let preserved = unsafe { std::slice::from_raw_parts(new_p, common) }
            .iter()
            .all(|&b| b == 0x42);
        heap.free(new_p);
        preserved
    }
}

//! The segregated free-list bucket array: insertion, removal and first-fit
//! search. Generalizes a single address-sorted free list into
//! eight unordered, head-inserted lists indexed by size class.

use crate::block::Block;
use crate::config::BUCKET_COUNT;
use crate::size_class::classify;

pub struct Buckets {
    heads: [Option<Block>; BUCKET_COUNT],
}

impl Buckets {
    pub const fn new() -> Self {
        Buckets { heads: [None; BUCKET_COUNT] }
    }

    /// Insert `block` at the head of its bucket. O(1).
    ///
    /// # Safety
    /// `block` must be a free block (not currently linked anywhere) with a
    /// payload large enough to hold the link pointers.
    pub unsafe fn insert(&mut self, block: Block) {
        let bucket = classify(block.payload_size());
        let old_head = self.heads[bucket];
        unsafe {
            block.set_links(None, old_head);
            if let Some(head) = old_head {
                head.set_links(Some(block), head.next_link());
            }
        }
        self.heads[bucket] = Some(block);
    }

    /// Unlink `block` from whichever bucket it is currently in. O(1).
    ///
    /// # Safety
    /// `block` must currently be linked into the bucket `classify` would
    /// compute for its payload size.
    pub unsafe fn remove(&mut self, block: Block) {
        let bucket = classify(block.payload_size());
        unsafe {
            let prev = block.prev_link();
            let next = block.next_link();
            match prev {
                Some(p) => p.set_links(p.prev_link(), next),
                None => self.heads[bucket] = next,
            }
            if let Some(n) = next {
                n.set_links(prev, n.next_link());
            }
        }
    }

    /// First-fit search starting at `classify(min_size)` and proceeding to
    /// higher buckets. Returns a block whose payload is *strictly* larger
    /// than `min_size`, leaving room to split off a minimum-size remainder.
    pub fn find_fit(&self, min_size: usize) -> Option<Block> {
        let start = classify(min_size);
        for bucket in &self.heads[start..] {
            let mut cur = *bucket;
            while let Some(block) = cur {
                if block.payload_size() > min_size {
                    return Some(block);
                }
                cur = unsafe { block.next_link() };
            }
        }
        None
    }
}

impl Default for Buckets {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Buckets {
    /// Test-only: is `block` currently linked in bucket `idx`?
    pub(crate) fn bucket_contains(&self, idx: usize, block: Block) -> bool {
        let mut cur = self.heads[idx];
        while let Some(b) = cur {
            if b == block {
                return true;
            }
            cur = unsafe { b.next_link() };
        }
        false
    }

    /// Test-only: number of blocks linked across all buckets.
    pub(crate) fn total_free_payload(&self) -> usize {
        let mut total = 0;
        for head in &self.heads {
            let mut cur = *head;
            while let Some(b) = cur {
                total += b.payload_size();
                cur = unsafe { b.next_link() };
            }
        }
        total
    }
}

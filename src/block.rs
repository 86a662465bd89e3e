//! On-heap block layout: header/footer boundary tags and the free-block
//! link area, modeled on a classic `FreeListNode` (size + footer word)
//! but generalized to carry the allocated/mapped flag bits the segregated
//! design needs.
//!
//! A block is addressed by its header pointer. Layout, 8-byte aligned
//! throughout:
//!
//! ```text
//! header (8) | [prev (8) | next (8)] | payload (>= 16) | footer (8, contiguous only)
//! ```
//!
//! The link pointers are only meaningful while the block is free; they are
//! overlaid by user payload once allocated.

use core::ptr;

const FLAG_ALLOC: usize = 1 << 0;
const FLAG_MAPPED: usize = 1 << 1;
const FLAG_MASK: usize = FLAG_ALLOC | FLAG_MAPPED;

const HEADER_SIZE: usize = 8;
const FOOTER_SIZE: usize = 8;

/// Encode a header/footer word from a payload size and flag bits.
#[inline]
fn encode(payload_size: usize, allocated: bool, mapped: bool) -> usize {
    debug_assert_eq!(payload_size & FLAG_MASK, 0, "payload size must be a multiple of 8");
    payload_size | if allocated { FLAG_ALLOC } else { 0 } | if mapped { FLAG_MAPPED } else { 0 }
}

#[inline]
fn decode(word: usize) -> (usize, bool, bool) {
    (word & !FLAG_MASK, word & FLAG_ALLOC != 0, word & FLAG_MAPPED != 0)
}

/// A block, identified by the address of its header word.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Block(pub *mut u8);

impl Block {
    #[inline]
    pub fn header_ptr(self) -> *mut usize {
        self.0 as *mut usize
    }

    /// # Safety
    /// `self.0` must point at a live, initialized header.
    #[inline]
    pub unsafe fn header(self) -> usize {
        unsafe { self.header_ptr().read() }
    }

    #[inline]
    pub fn payload_size(self) -> usize {
        unsafe { decode(self.header()).0 }
    }

    #[inline]
    pub fn is_allocated(self) -> bool {
        unsafe { decode(self.header()).1 }
    }

    #[inline]
    pub fn is_mapped(self) -> bool {
        unsafe { decode(self.header()).2 }
    }

    #[inline]
    pub fn payload_ptr(self) -> *mut u8 {
        unsafe { self.0.add(HEADER_SIZE) }
    }

    /// Footer pointer. Only valid to dereference for a contiguous-origin block.
    #[inline]
    pub fn footer_ptr(self) -> *mut usize {
        unsafe { self.payload_ptr().add(self.payload_size()) as *mut usize }
    }

    /// Total on-heap size, header through footer (or header+payload for mapped blocks).
    #[inline]
    pub fn total_size(self) -> usize {
        let payload = self.payload_size();
        if self.is_mapped() {
            HEADER_SIZE + payload
        } else {
            HEADER_SIZE + payload + FOOTER_SIZE
        }
    }

    /// Initialize a fresh block's header (and footer, if contiguous).
    ///
    /// # Safety
    /// `self.0 .. self.0 + header + payload_size (+ footer)` must be valid
    /// for reads and writes.
    pub unsafe fn init(self, payload_size: usize, allocated: bool, mapped: bool) {
        let word = encode(payload_size, allocated, mapped);
        unsafe {
            self.header_ptr().write(word);
            if !mapped {
                self.footer_ptr().write(word);
            }
        }
    }

    /// Set the allocated flag, mirroring to the footer if present.
    ///
    /// # Safety
    /// `self` must be a valid, initialized block.
    pub unsafe fn set_allocated(self, allocated: bool) {
        unsafe {
            let (size, _, mapped) = decode(self.header());
            let word = encode(size, allocated, mapped);
            self.header_ptr().write(word);
            if !mapped {
                self.footer_ptr().write(word);
            }
        }
    }

    /// Grow the payload size in place, rewriting header and footer.
    ///
    /// # Safety
    /// The caller must ensure the new footer position is within the arena
    /// and that the block is contiguous-origin (never mapped).
    pub unsafe fn set_payload_size(self, payload_size: usize) {
        unsafe {
            let (_, allocated, mapped) = decode(self.header());
            debug_assert!(!mapped);
            let word = encode(payload_size, allocated, mapped);
            self.header_ptr().write(word);
            self.footer_ptr().write(word);
        }
    }

    /// Recover the block owning a user-facing payload pointer.
    #[inline]
    pub fn from_payload(payload: *mut u8) -> Block {
        Block(unsafe { payload.sub(HEADER_SIZE) })
    }

    /// The block immediately preceding `self` in the contiguous arena, found
    /// via its footer, or `None` if `self` sits at `arena_start`.
    ///
    /// # Safety
    /// If `self` is not at `arena_start`, the 8 bytes immediately preceding
    /// `self.0` must be a valid footer word of a contiguous-origin block.
    pub unsafe fn prev_in_arena(self, arena_start: *mut u8) -> Option<Block> {
        if self.0 == arena_start {
            return None;
        }
        unsafe {
            let prev_footer = (self.0 as *mut usize).sub(1);
            let (size, _, _) = decode(prev_footer.read());
            Some(Block(self.0.sub(HEADER_SIZE + FOOTER_SIZE + size)))
        }
    }

    /// The block immediately following `self` in the contiguous arena, or
    /// `None` if `self` is the last block (its end equals `arena_end`).
    ///
    /// # Safety
    /// `self` must be a contiguous-origin block whose footer has already
    /// been written.
    pub unsafe fn next_in_arena(self, arena_end: *mut u8) -> Option<Block> {
        let next = unsafe { self.footer_ptr().add(1) } as *mut u8;
        if next == arena_end {
            None
        } else {
            Some(Block(next))
        }
    }

    // -- free-list link area, only meaningful while the block is free --

    #[inline]
    fn prev_link_ptr(self) -> *mut *mut u8 {
        self.payload_ptr() as *mut *mut u8
    }

    #[inline]
    fn next_link_ptr(self) -> *mut *mut u8 {
        unsafe { self.prev_link_ptr().add(1) }
    }

    /// # Safety
    /// `self` must be a free block with at least `MIN_PAYLOAD` bytes of payload.
    pub unsafe fn set_links(self, prev: Option<Block>, next: Option<Block>) {
        unsafe {
            self.prev_link_ptr()
                .write(prev.map_or(ptr::null_mut(), |b| b.0));
            self.next_link_ptr()
                .write(next.map_or(ptr::null_mut(), |b| b.0));
        }
    }

    /// # Safety
    /// `self` must be a free block whose link area was previously written.
    pub unsafe fn prev_link(self) -> Option<Block> {
        let p = unsafe { self.prev_link_ptr().read() };
        if p.is_null() { None } else { Some(Block(p)) }
    }

    /// # Safety
    /// `self` must be a free block whose link area was previously written.
    pub unsafe fn next_link(self) -> Option<Block> {
        let p = unsafe { self.next_link_ptr().read() };
        if p.is_null() { None } else { Some(Block(p)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        assert_eq!(decode(encode(1024, true, false)), (1024, true, false));
        assert_eq!(decode(encode(16, false, true)), (16, false, true));
        assert_eq!(decode(encode(0, false, false)), (0, false, false));
    }

    #[test]
    fn init_and_read_contiguous_block() {
        let mut buf = [0u8; 64];
        let block = Block(buf.as_mut_ptr());
        unsafe {
            block.init(48, false, false);
            assert_eq!(block.payload_size(), 48);
            assert!(!block.is_allocated());
            assert!(!block.is_mapped());
            assert_eq!(block.header(), block.footer_ptr().read());
        }
    }

    #[test]
    fn mapped_block_has_no_footer_semantics() {
        let mut buf = [0u8; 32];
        let block = Block(buf.as_mut_ptr());
        unsafe {
            block.init(24, true, true);
            assert_eq!(block.total_size(), 8 + 24);
        }
    }
}

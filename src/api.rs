//! The thin public API veneer around the allocator core: argument
//! validation, the four operations from the crate's external-interfaces
//! table, the zero-fill loop behind the calloc variant, and the
//! copy-and-free body behind the reallocate variant — all of it sitting
//! above the process-wide `Heap` singleton, which implements only the two
//! true core operations, `allocate` and `free`.

use std::ptr;

use crate::block::Block;
use crate::error::fatal;
use crate::heap::Heap;
use crate::utils::locked::Locked;

static HEAP: Locked<Heap> = Locked::new(Heap::new());

/// Allocate at least `size` bytes, 8-byte aligned.
///
/// # Safety
/// `size` must be nonzero. The returned pointer must eventually be passed
/// to exactly one of [`free`] or [`reallocate`].
pub unsafe fn allocate(size: usize) -> *mut u8 {
    if size == 0 {
        fatal("allocate called with size == 0");
    }
    HEAP.lock().allocate(size)
}

/// Allocate `count * size` zeroed bytes.
///
/// # Safety
/// `count` and `size` must both be nonzero and their product must not
/// overflow `usize`. The returned pointer must eventually be passed to
/// exactly one of [`free`] or [`reallocate`].
pub unsafe fn zeroed_allocate(count: usize, size: usize) -> *mut u8 {
    if count == 0 || size == 0 {
        fatal("zeroed_allocate called with a zero count or size");
    }
    let total = count
        .checked_mul(size)
        .unwrap_or_else(|| fatal("zeroed_allocate: count * size overflows"));

    let ptr = HEAP.lock().allocate(total);
    unsafe { ptr::write_bytes(ptr, 0, total) };
    ptr
}

/// Resize a previous allocation, preserving the common prefix. `ptr` may be
/// null (behaves as [`allocate`]); `size` may be zero (behaves as [`free`]
/// and returns null).
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by `allocate`,
/// `zeroed_allocate` or `reallocate` that has not since been freed.
pub unsafe fn reallocate(ptr: *mut u8, size: usize) -> *mut u8 {
    if ptr.is_null() {
        return if size == 0 { ptr::null_mut() } else { unsafe { allocate(size) } };
    }
    if size == 0 {
        unsafe { free(ptr) };
        return ptr::null_mut();
    }

    let old_block = Block::from_payload(ptr);
    if !old_block.is_allocated() {
        fatal("reallocate called on a pointer that is not a live allocation");
    }
    let old_size = old_block.payload_size();

    let new_ptr = unsafe { allocate(size) };
    let copy_len = old_size.min(size);
    unsafe { ptr::copy_nonoverlapping(ptr, new_ptr, copy_len) };
    unsafe { free(ptr) };
    new_ptr
}

/// Free a previous allocation.
///
/// # Safety
/// `ptr` must be non-null and must have been returned by `allocate`,
/// `zeroed_allocate` or `reallocate` and not already freed.
pub unsafe fn free(ptr: *mut u8) {
    if ptr.is_null() {
        fatal("free called with a null pointer");
    }
    HEAP.lock().free(ptr);
}

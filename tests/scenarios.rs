//! Integration tests against the crate's public surface: the four
//! `api`-level operations and the `GlobalAlloc` adapter, as opposed to the
//! structural unit tests inside `src/heap.rs` that reach into private
//! allocator state.
//!
//! All tests here drive the same process-wide singleton behind `segalloc`'s
//! public functions, which in turn shares the real `sbrk`/`mmap` state with
//! every other test in this binary. `cargo test` runs test functions from
//! multiple threads by default, so every test takes `LOCK` for its duration.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::{Mutex, MutexGuard, OnceLock};

use segalloc::GlobalAllocAdapter;

static LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn guard() -> MutexGuard<'static, ()> {
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn allocate_write_free_round_trip() {
    let _g = guard();
    unsafe {
        let p = segalloc::allocate(32);
        assert!(!p.is_null());
        assert_eq!(p as usize % 8, 0);
        p.write_bytes(0x11, 32);
        segalloc::free(p);
    }
}

#[test]
fn zeroed_allocate_is_actually_zero() {
    let _g = guard();
    unsafe {
        let p = segalloc::zeroed_allocate(16, 8);
        let bytes = std::slice::from_raw_parts(p, 128);
        assert!(bytes.iter().all(|&b| b == 0));
        segalloc::free(p);
    }
}

#[test]
fn reallocate_from_null_behaves_as_allocate() {
    let _g = guard();
    unsafe {
        let p = segalloc::reallocate(std::ptr::null_mut(), 64);
        assert!(!p.is_null());
        segalloc::free(p);
    }
}

#[test]
fn reallocate_to_zero_frees_and_returns_null() {
    let _g = guard();
    unsafe {
        let p = segalloc::allocate(64);
        let result = segalloc::reallocate(p, 0);
        assert!(result.is_null());
    }
}

#[test]
fn many_small_allocations_are_distinct_and_writable() {
    let _g = guard();
    unsafe {
        let mut ptrs = Vec::new();
        for i in 0..64u8 {
            let p = segalloc::allocate(24);
            p.write_bytes(i, 24);
            ptrs.push(p);
        }
        for (i, &p) in ptrs.iter().enumerate() {
            let bytes = std::slice::from_raw_parts(p, 24);
            assert!(bytes.iter().all(|&b| b == i as u8));
        }
        for p in ptrs {
            segalloc::free(p);
        }
    }
}

#[test]
fn large_allocation_round_trip() {
    let _g = guard();
    unsafe {
        let p = segalloc::allocate(64 * 1024);
        p.write_bytes(0xEE, 64 * 1024);
        let bytes = std::slice::from_raw_parts(p, 64 * 1024);
        assert!(bytes.iter().all(|&b| b == 0xEE));
        segalloc::free(p);
    }
}

#[test]
fn global_alloc_adapter_round_trip() {
    let _g = guard();
    let adapter = GlobalAllocAdapter;
    let layout = Layout::from_size_align(128, 8).unwrap();
    unsafe {
        let p = adapter.alloc(layout);
        assert!(!p.is_null());
        p.write_bytes(0x7A, 128);

        let bigger = adapter.realloc(p, layout, 256);
        assert!(!bigger.is_null());
        let bytes = std::slice::from_raw_parts(bigger, 128);
        assert!(bytes.iter().all(|&b| b == 0x7A));

        adapter.dealloc(bigger, Layout::from_size_align(256, 8).unwrap());
    }
}

#[test]
fn global_alloc_adapter_zeroed() {
    let _g = guard();
    let adapter = GlobalAllocAdapter;
    let layout = Layout::from_size_align(64, 8).unwrap();
    unsafe {
        let p = adapter.alloc_zeroed(layout);
        let bytes = std::slice::from_raw_parts(p, 64);
        assert!(bytes.iter().all(|&b| b == 0));
        adapter.dealloc(p, layout);
    }
}

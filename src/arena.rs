//! Downstream OS primitives: contiguous break-pointer extension via
//! `sbrk(2)` and anonymous page mapping via `mmap(2)`/`munmap(2)`.
//!
//! None of the five example kernels this crate was otherwise modeled on run
//! hosted, so this module is grounded instead on the `libc`-based pattern
//! real hosted Rust allocators use for the same primitives (sbrk-based bump
//! allocation and mmap-backed large allocation). Failure of either syscall
//! is fatal to the core, per the error-handling design: there is no
//! fallback between backends.

use std::sync::OnceLock;

use crate::error::fatal;

/// Where a block's backing memory came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Origin {
    Contiguous,
    Mapped,
}

pub struct Acquired {
    pub ptr: *mut u8,
    pub len: usize,
    pub origin: Origin,
}

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// The system page size, queried once and memoized.
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size <= 0 {
            fatal("sysconf(_SC_PAGESIZE) failed");
        }
        size as usize
    })
}

/// Extend the contiguous arena by exactly `n_bytes`, returning the address
/// of the new region. Monotonic: every call hands back memory immediately
/// past the previous call's region (assuming nothing else moves the break).
pub fn extend_arena(n_bytes: usize) -> *mut u8 {
    log::trace!("extend_arena: requesting {n_bytes} bytes via sbrk");
    let prev = unsafe { libc::sbrk(n_bytes as libc::intptr_t) };
    if prev == -1isize as *mut libc::c_void {
        log::warn!("sbrk({n_bytes}) failed: arena exhausted");
        fatal("sbrk failed: contiguous arena exhausted");
    }
    prev as *mut u8
}

/// Map at least `n_bytes` of fresh, zeroed, read/write anonymous memory,
/// rounded up to a whole number of pages. Returns the mapping and its exact
/// length (required later for `unmap`).
pub fn map_anonymous(n_bytes: usize) -> (*mut u8, usize) {
    let len = round_up_to_page(n_bytes);
    log::trace!("map_anonymous: requesting {len} bytes via mmap");
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        log::warn!("mmap({len}) failed: out of address space or memory");
        fatal("mmap failed: cannot map anonymous pages");
    }
    (ptr as *mut u8, len)
}

/// Release a prior mapping. `len` must be the exact length `map_anonymous`
/// returned for this pointer.
pub fn unmap(ptr: *mut u8, len: usize) {
    log::trace!("unmap: releasing {len} bytes at {ptr:p}");
    let rc = unsafe { libc::munmap(ptr as *mut libc::c_void, len) };
    if rc != 0 {
        fatal("munmap failed");
    }
}

fn round_up_to_page(n_bytes: usize) -> usize {
    let page = page_size();
    (n_bytes + page - 1) & !(page - 1)
}

/// Acquire fresh backing memory for a block whose requested payload size
/// (already rounded by `size_class::round_up`) is `payload_size`. Dispatches
/// between the contiguous arena and a direct mapping per
/// `config::MAX_CONTIGUOUS_PAYLOAD`.
pub fn acquire(payload_size: usize) -> Acquired {
    if payload_size <= crate::config::MAX_CONTIGUOUS_PAYLOAD {
        let total = payload_size + 16; // header + footer
        let ptr = extend_arena(total);
        Acquired { ptr, len: total, origin: Origin::Contiguous }
    } else {
        let (ptr, len) = map_anonymous(payload_size + 8); // header only
        Acquired { ptr, len, origin: Origin::Mapped }
    }
}

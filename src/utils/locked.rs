//! Interior-mutability wrapper for the process-wide allocator singleton.
//!
//! The core is specified as single-threaded cooperative with no lock of its
//! own (see the crate's concurrency section): `Locked` only gets the
//! compiler out of the way, it does not provide any exclusion. Callers in a
//! multithreaded embedder are responsible for serializing access.

use core::cell::UnsafeCell;

pub struct Locked<A> {
    inner: UnsafeCell<A>,
}

// Safe only insofar as callers uphold the single-writer-at-a-time contract
// documented above; this type performs no synchronization itself.
unsafe impl<A> Sync for Locked<A> {}

impl<A> Locked<A> {
    pub const fn new(inner: A) -> Self {
        Locked {
            inner: UnsafeCell::new(inner),
        }
    }

    /// # Safety
    /// The caller must ensure no other `lock()` borrow of the same `Locked`
    /// is live for the duration of the returned reference.
    pub fn lock(&self) -> &mut A {
        unsafe { &mut *self.inner.get() }
    }
}

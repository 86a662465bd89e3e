//! Serializes tests that exercise the real process break pointer and
//! anonymous mappings.
//!
//! `cargo test` runs `#[test]` functions from multiple threads in the same
//! process by default. `sbrk`/`mmap` are process-global, so two tests each
//! constructing their own `Heap` and growing the arena concurrently would
//! race on the same break pointer and corrupt each other's bookkeeping. Every
//! test that touches a real `Heap` takes this lock for its duration.

use std::sync::{Mutex, MutexGuard, OnceLock};

static LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub fn guard() -> MutexGuard<'static, ()> {
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

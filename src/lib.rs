//! A general-purpose dynamic memory allocator for a single hosted process.
//!
//! Small requests (rounded payload ≤ 1024 bytes) are served from a single
//! contiguous arena grown with `sbrk(2)`; blocks carry header/footer
//! boundary tags and are tracked in eight segregated free lists. Large
//! requests are served by a direct, standalone `mmap(2)` mapping, unmapped
//! whole on free. See `DESIGN.md` for how each piece fits together.
//!
//! The four operations mirror libc's `malloc`/`calloc`/`realloc`/`free`:
//!
//! ```
//! # use segalloc::{allocate, free};
//! unsafe {
//!     let p = allocate(64);
//!     p.write_bytes(0xAB, 64);
//!     free(p);
//! }
//! ```
//!
//! Every failure mode — a violated invariant, OS resource exhaustion, or a
//! caller contract violation — is fatal and aborts the process; there is no
//! recoverable error path (see the crate's error-handling design).

mod api;
mod arena;
mod block;
mod config;
mod error;
mod freelist;
mod global_alloc;
mod heap;
mod placement;
mod size_class;
mod utils;

pub use api::{allocate, free, reallocate, zeroed_allocate};
pub use global_alloc::GlobalAllocAdapter;

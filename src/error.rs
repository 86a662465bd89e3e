//! Fatal-error reporting.
//!
//! Every error this allocator can produce — a violated invariant, OS
//! resource exhaustion, or a caller contract violation — is fatal; there is
//! no recoverable path. `fatal` logs a structured message (so a crash still
//! leaves a trace in whatever `log` sink the embedder installed, echoing the
//! teacher's `alloc_error_handler`, which writes to the console before
//! halting) and then aborts the process without unwinding.

#[cold]
#[inline(never)]
pub fn fatal(message: &str) -> ! {
    log::error!("segalloc: fatal: {message}");
    std::process::abort();
}

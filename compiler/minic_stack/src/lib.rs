//! Stack growth for deeply nested source.
//!
//! The parser and the IR generator both recurse once per nesting level, so
//! `((((1))))` nested a hundred thousand deep would overflow a fixed thread
//! stack. Each recursive entry point wraps its body in
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment
//! when the current one runs low.
//!
//! On `wasm32` the guard is a plain call.

/// Grow when less than this much stack is left.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a new stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

//! Stack safety for deeply nested trees.
//!
//! Parsing, writing and copying an element tree all recurse once per level
//! of nesting, and markup can nest as deep as the input is long. Wrapping
//! each level in [`ensure_sufficient_stack`] grows the stack on demand
//! instead of overflowing it.

/// If less than this much stack remains, grow it (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is close to running out.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

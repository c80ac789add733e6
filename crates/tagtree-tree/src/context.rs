//! Memory accounting for parse-time allocations.

use std::cell::Cell;
use std::fmt;

use tracing::debug;

/// A source of memory for values created while parsing.
///
/// Rust owns the actual allocation; a context only decides whether a
/// request of `bytes` may go ahead. Hosts use it to cap how much a single
/// document may allocate, or to inject failures in tests.
pub trait MemoryContext {
    /// Ask for `bytes` more bytes.
    fn allocate(&self, bytes: usize) -> Result<(), AllocError>;

    /// Give `bytes` back. The default does nothing.
    fn release(&self, bytes: usize) {
        let _ = bytes;
    }
}

/// A context that never refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Global;

impl MemoryContext for Global {
    #[inline]
    fn allocate(&self, _bytes: usize) -> Result<(), AllocError> {
        Ok(())
    }
}

/// A context with a fixed byte budget.
///
/// Requests that would take the running total past the limit are refused
/// and leave the total unchanged.
#[derive(Debug)]
pub struct Budget {
    limit: usize,
    used: Cell<usize>,
}

impl Budget {
    /// Create a budget of `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: Cell::new(0),
        }
    }

    /// Bytes handed out so far.
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.limit - self.used.get()
    }

    /// The configured limit.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl MemoryContext for Budget {
    fn allocate(&self, bytes: usize) -> Result<(), AllocError> {
        let available = self.remaining();
        if bytes > available {
            debug!(requested = bytes, available, "budget exhausted");
            return Err(AllocError {
                requested: bytes,
                available,
            });
        }
        self.used.set(self.used.get() + bytes);
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.used.set(self.used.get().saturating_sub(bytes));
    }
}

impl<C: MemoryContext + ?Sized> MemoryContext for &C {
    fn allocate(&self, bytes: usize) -> Result<(), AllocError> {
        (**self).allocate(bytes)
    }

    fn release(&self, bytes: usize) {
        (**self).release(bytes)
    }
}

/// A memory context refused an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    /// Bytes that were asked for.
    pub requested: usize,
    /// Bytes the context still had available.
    pub available: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocation of {} bytes refused ({} available)",
            self.requested, self.available
        )
    }
}

impl std::error::Error for AllocError {}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_global_never_refuses() {
        assert!(Global.allocate(usize::MAX).is_ok());
    }

    #[test]
    fn test_budget_refuses_past_limit() {
        let budget = Budget::new(10);
        assert!(budget.allocate(6).is_ok());
        assert_eq!(budget.used(), 6);

        let err = budget.allocate(5).unwrap_err();
        assert_eq!(
            err,
            AllocError {
                requested: 5,
                available: 4
            }
        );
        // A refused request does not count.
        assert_eq!(budget.used(), 6);

        assert!(budget.allocate(4).is_ok());
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.limit(), 10);
        assert!(budget.allocate(0).is_ok());
        assert!(budget.allocate(1).is_err());
    }

    #[test]
    fn test_budget_release() {
        let budget = Budget::new(8);
        budget.allocate(8).unwrap();
        budget.release(3);
        assert_eq!(budget.remaining(), 3);
        budget.release(100);
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_alloc_error_display() {
        let err = AllocError {
            requested: 32,
            available: 7,
        };
        assert_eq!(err.to_string(), "allocation of 32 bytes refused (7 available)");
    }
}

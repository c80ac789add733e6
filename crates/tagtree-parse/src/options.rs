//! Parser configuration.

/// What to do when the input ends while an element is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationPolicy {
    /// Return the element built so far without a diagnostic.
    #[default]
    Lenient,
    /// Return the element built so far and record
    /// [`DiagnosticKind::UnexpectedEndOfInput`](crate::DiagnosticKind::UnexpectedEndOfInput).
    Strict,
}

/// Options for [`Parser`](crate::Parser).
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Handling of input that stops inside an element (default: lenient)
    pub truncation: TruncationPolicy,
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report input that ends inside an element.
    pub fn strict(mut self) -> Self {
        self.truncation = TruncationPolicy::Strict;
        self
    }

    /// Set the truncation policy.
    pub fn truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }
}

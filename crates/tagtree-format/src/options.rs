//! Serializer configuration.

/// Options for [`ElementWriter`](crate::ElementWriter).
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Indentation unit, repeated once per nesting level (default: a tab)
    pub indent: &'static str,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent: "\t" }
    }
}

impl FormatOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom indentation string.
    pub fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }
}

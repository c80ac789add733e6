//! Parse diagnostics and their rendering.

use std::fmt;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use tagtree_tokenizer::Position;
use tracing::debug;

/// Maximum number of diagnostics a parser keeps, sentinel included.
pub const DIAGNOSTIC_CAPACITY: usize = 16;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A closing tag was not followed by `>`.
    NoClosingSymbolFound,
    /// The input did not start with `<`.
    NoOpeningSymbolFound,
    /// A closing tag named a different element than the one open.
    MismatchedClosingTag,
    /// An attribute name was not followed by `=`.
    MissingEqualsSign,
    /// An `=` was not followed by a value.
    MissingAttributeValue,
    /// A `<` was not followed by an element name.
    MissingElementName,
    /// The diagnostic buffer filled up; nothing after this is reported.
    TooManyErrors,
    /// The input ended inside an element. Only reported under
    /// [`TruncationPolicy::Strict`](crate::TruncationPolicy::Strict).
    UnexpectedEndOfInput,
}

impl DiagnosticKind {
    /// The fixed sentence every message of this kind starts with.
    pub fn base_message(&self) -> &'static str {
        match self {
            DiagnosticKind::NoClosingSymbolFound => "No closing '>' found for element.",
            DiagnosticKind::NoOpeningSymbolFound => "Couldn't find a '>' to start parsing with.",
            DiagnosticKind::MismatchedClosingTag => "Closing element is in the wrong order.",
            DiagnosticKind::MissingEqualsSign => "Expected '=' after attribute.",
            DiagnosticKind::MissingAttributeValue => {
                "Expected value after '=' in attribute, but none found."
            }
            DiagnosticKind::MissingElementName => "Expected name of element after opening '<'.",
            DiagnosticKind::TooManyErrors => {
                "Too many errors were thrown. No more errors will be reported."
            }
            DiagnosticKind::UnexpectedEndOfInput => "Input ended before the element was closed.",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::NoClosingSymbolFound => "expected '>' here",
            DiagnosticKind::NoOpeningSymbolFound => "expected '<' here",
            DiagnosticKind::MismatchedClosingTag => "closing tag does not match",
            DiagnosticKind::MissingEqualsSign => "expected '=' here",
            DiagnosticKind::MissingAttributeValue => "expected a value here",
            DiagnosticKind::MissingElementName => "expected a name here",
            DiagnosticKind::TooManyErrors => "reporting stopped here",
            DiagnosticKind::UnexpectedEndOfInput => "input ends here",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            DiagnosticKind::MismatchedClosingTag => {
                Some("elements must be closed in the reverse order they were opened")
            }
            DiagnosticKind::MissingAttributeValue => {
                Some("attribute values are written as name=\"value\"")
            }
            DiagnosticKind::UnexpectedEndOfInput => Some("add the missing closing tag"),
            _ => None,
        }
    }
}

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    expected: Option<Vec<u8>>,
    actual: Option<Vec<u8>>,
    position: Position,
    message: String,
}

impl Diagnostic {
    /// Create a diagnostic. Empty names count as absent.
    pub fn new(
        kind: DiagnosticKind,
        expected: Option<&[u8]>,
        actual: Option<&[u8]>,
        position: Position,
    ) -> Self {
        let expected = expected.filter(|name| !name.is_empty()).map(<[u8]>::to_vec);
        let actual = actual.filter(|name| !name.is_empty()).map(<[u8]>::to_vec);
        let message = render_message(kind, expected.as_deref(), actual.as_deref());
        Self {
            kind,
            expected,
            actual,
            position,
            message,
        }
    }

    /// The kind of problem.
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// The name that was expected, if relevant.
    pub fn expected(&self) -> Option<&[u8]> {
        self.expected.as_deref()
    }

    /// The name that was found, if relevant.
    pub fn actual(&self) -> Option<&[u8]> {
        self.actual.as_deref()
    }

    /// Where the tokenizer was when the problem was noticed.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The rendered message, without position.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render this diagnostic with ariadne.
    ///
    /// Returns a string containing the formatted report with source context.
    pub fn render(&self, filename: &str, source: &[u8]) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &[u8], writer: W) {
        let text = String::from_utf8_lossy(source);
        let range = self.label_range(source, &text);

        let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message(self.kind.label())
                    .with_color(Color::Red),
            );
        if let Some(help) = self.kind.help() {
            report = report.with_help(help);
        }
        let _ = report
            .finish()
            .write((filename, Source::from(text.as_ref())), writer);
    }

    /// One-byte range at the recorded offset, mapped into the lossily
    /// decoded text.
    fn label_range(&self, source: &[u8], text: &str) -> std::ops::Range<usize> {
        let offset = self.position.offset.min(source.len());
        let mut start = String::from_utf8_lossy(&source[..offset]).len().min(text.len());
        while !text.is_char_boundary(start) {
            start -= 1;
        }
        let end = text[start..]
            .chars()
            .next()
            .map_or(start, |c| start + c.len_utf8());
        start..end
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.position)
    }
}

impl std::error::Error for Diagnostic {}

fn render_message(kind: DiagnosticKind, expected: Option<&[u8]>, actual: Option<&[u8]>) -> String {
    let base = kind.base_message();
    match (expected, actual) {
        (None, Some(actual)) => format!("{base} Name: {}", String::from_utf8_lossy(actual)),
        (Some(expected), Some(actual)) => format!(
            "{base} Expected: {}, got: {}",
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(actual)
        ),
        _ => base.to_string(),
    }
}

/// The bounded list of diagnostics a parser collects.
///
/// Holds at most [`DIAGNOSTIC_CAPACITY`] entries. When the one before last
/// slot is taken, a [`DiagnosticKind::TooManyErrors`] entry fills the last
/// slot and later reports are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty buffer with room for every entry it can hold.
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(DIAGNOSTIC_CAPACITY),
        }
    }

    /// Record a diagnostic. Returns `false` if the buffer was already full.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        expected: Option<&[u8]>,
        actual: Option<&[u8]>,
        position: Position,
    ) -> bool {
        if self.is_full() {
            return false;
        }
        let diagnostic = Diagnostic::new(kind, expected, actual, position);
        debug!(%diagnostic, "diagnostic");
        self.entries.push(diagnostic);

        if self.entries.len() == DIAGNOSTIC_CAPACITY - 1 {
            self.entries.push(Diagnostic::new(
                DiagnosticKind::TooManyErrors,
                None,
                None,
                position,
            ));
        }
        true
    }

    /// Whether no further diagnostics will be recorded.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= DIAGNOSTIC_CAPACITY
    }

    /// Number of recorded diagnostics, sentinel included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a diagnostic by index.
    pub fn get(&self, index: usize) -> Option<&Diagnostic> {
        self.entries.get(index)
    }

    /// Iterate in the order the diagnostics were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// All diagnostics as a slice.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

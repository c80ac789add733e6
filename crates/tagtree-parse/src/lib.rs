#![doc = include_str!("../README.md")]

pub use tagtree_tokenizer::{Position, Span, Token, TokenKind, Tokenizer};
pub use tagtree_tree::{AllocError, Budget, Element, Global, MemoryContext};

mod diagnostic;
pub use diagnostic::{DIAGNOSTIC_CAPACITY, Diagnostic, DiagnosticKind, Diagnostics};

mod options;
pub use options::{ParseOptions, TruncationPolicy};

mod parser;
pub use parser::Parser;

/// The outcome of [`parse`].
#[derive(Debug)]
pub struct Parsed<'src> {
    /// The root element, as complete as the input allowed.
    pub root: Element<'src>,
    /// Problems found along the way.
    pub diagnostics: Diagnostics,
    /// The first allocation the memory context refused, if any.
    pub allocation_failure: Option<AllocError>,
    /// Bytes charged to the memory context for `root`.
    pub charged: usize,
}

/// Parse the first element of `source` with default options.
pub fn parse(source: &[u8]) -> Parsed<'_> {
    parse_with_options(source, ParseOptions::default())
}

/// Parse the first element of `source`.
pub fn parse_with_options(source: &[u8], options: ParseOptions) -> Parsed<'_> {
    let mut tokenizer = Tokenizer::new(source);
    let parser = Parser::with_options(&mut tokenizer, options);
    run(parser)
}

/// Parse the first element of `source`, charging allocations to `context`.
///
/// Fails only if the context cannot afford the parser itself. Refusals
/// later on are reported in [`Parsed::allocation_failure`]. The tree's
/// bytes go back to `context` when the returned [`ParsedIn`] is dropped.
pub fn parse_in<'src, 'c>(
    source: &'src [u8],
    context: &'c dyn MemoryContext,
    options: ParseOptions,
) -> Result<ParsedIn<'src, 'c>, AllocError> {
    let mut tokenizer = Tokenizer::new(source);
    let parser = Parser::new_in(&mut tokenizer, context, options)?;
    Ok(ParsedIn {
        parsed: run(parser),
        context,
    })
}

fn run<'src>(mut parser: Parser<'_, 'src>) -> Parsed<'src> {
    let root = parser.read_element();
    let charged = parser.charged();
    let (diagnostics, allocation_failure) = parser.finish();
    Parsed {
        root,
        diagnostics,
        allocation_failure,
        charged,
    }
}

/// A [`Parsed`] tree whose memory is owed to a [`MemoryContext`].
///
/// Dereferences to [`Parsed`]. Dropping it releases [`Parsed::charged`]
/// bytes back to the context.
pub struct ParsedIn<'src, 'c> {
    parsed: Parsed<'src>,
    context: &'c dyn MemoryContext,
}

impl<'src> std::ops::Deref for ParsedIn<'src, '_> {
    type Target = Parsed<'src>;

    fn deref(&self) -> &Parsed<'src> {
        &self.parsed
    }
}

impl std::fmt::Debug for ParsedIn<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedIn")
            .field("parsed", &self.parsed)
            .finish_non_exhaustive()
    }
}

impl Drop for ParsedIn<'_, '_> {
    fn drop(&mut self) {
        self.context.release(self.parsed.charged);
    }
}

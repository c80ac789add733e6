//! Recursive-descent element parser.

use std::borrow::Cow;
use std::mem::size_of;

use tagtree_tokenizer::{Position, TokenKind, Tokenizer};
use tagtree_tree::{AllocError, Element, Global, MemoryContext, ensure_sufficient_stack};
use tracing::{debug, trace};

use crate::diagnostic::{DIAGNOSTIC_CAPACITY, Diagnostic, DiagnosticKind, Diagnostics};
use crate::options::{ParseOptions, TruncationPolicy};

/// Error-tolerant parser that turns tokens into an [`Element`] tree.
///
/// The parser never gives up. Every problem it meets is recorded in a
/// bounded [`Diagnostics`] buffer and parsing continues with a best guess,
/// so [`Parser::read_element`] always returns an element.
pub struct Parser<'t, 'src> {
    tokenizer: &'t mut Tokenizer<'src>,
    context: &'t dyn MemoryContext,
    options: ParseOptions,
    diagnostics: Diagnostics,
    /// First allocation the context refused.
    allocation_failure: Option<AllocError>,
    /// Bytes charged to `context` for the parser itself.
    footprint: usize,
    /// Bytes charged for values that are now part of returned elements.
    charged: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    /// Create a parser with default options that never runs out of memory.
    pub fn new(tokenizer: &'t mut Tokenizer<'src>) -> Self {
        Self::with_options(tokenizer, ParseOptions::default())
    }

    /// Create a parser with the given options.
    pub fn with_options(tokenizer: &'t mut Tokenizer<'src>, options: ParseOptions) -> Self {
        Self {
            tokenizer,
            context: &Global,
            options,
            diagnostics: Diagnostics::new(),
            allocation_failure: None,
            footprint: 0,
            charged: 0,
        }
    }

    /// Create a parser whose allocations are charged to `context`.
    ///
    /// The parser and its diagnostic buffer are charged up front; if the
    /// context refuses, no parser is created.
    pub fn new_in(
        tokenizer: &'t mut Tokenizer<'src>,
        context: &'t dyn MemoryContext,
        options: ParseOptions,
    ) -> Result<Self, AllocError> {
        let footprint = size_of::<Self>() + DIAGNOSTIC_CAPACITY * size_of::<Diagnostic>();
        context.allocate(footprint)?;
        Ok(Self {
            tokenizer,
            context,
            options,
            diagnostics: Diagnostics::new(),
            allocation_failure: None,
            footprint,
            charged: 0,
        })
    }

    /// Whether any diagnostic has been recorded.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// The diagnostics recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The first allocation the memory context refused, if any.
    ///
    /// The value that needed the memory (an attribute value, a text
    /// fragment or a child element) was left out of the tree.
    pub fn allocation_failure(&self) -> Option<&AllocError> {
        self.allocation_failure.as_ref()
    }

    /// Bytes charged to the context for the elements parsed so far.
    ///
    /// Unlike the parser's own footprint these stay charged after the
    /// parser is dropped; hand them to [`MemoryContext::release`] once the
    /// elements are gone.
    pub fn charged(&self) -> usize {
        self.charged
    }

    /// Where the tokenizer currently is.
    pub fn position(&self) -> Position {
        Tokenizer::position(self.tokenizer)
    }

    /// Hand over the diagnostics and allocation failure, ending the parse.
    pub fn finish(mut self) -> (Diagnostics, Option<AllocError>) {
        (
            std::mem::take(&mut self.diagnostics),
            self.allocation_failure.take(),
        )
    }

    /// Parse one element, starting at its opening `<`.
    pub fn read_element(&mut self) -> Element<'src> {
        self.read_element_inner(false)
    }

    fn read_element_inner(&mut self, skip_opening_tag: bool) -> Element<'src> {
        if !skip_opening_tag && self.tokenizer.next_token().kind != TokenKind::OpenAngle {
            self.report(DiagnosticKind::NoOpeningSymbolFound, None, None);
        }

        let name = self.tokenizer.next_token();
        if !name.is_text() {
            self.report(DiagnosticKind::MissingElementName, None, None);
        }
        let mut element = Element::new(name.text);
        trace!(name = %element.name_str(), "Parsing element");

        let self_closing = loop {
            let token = self.tokenizer.next_token();
            match token.kind {
                TokenKind::Eof => {
                    self.truncated(&element);
                    return element;
                }
                TokenKind::Slash => {
                    let closes = self.tokenizer.current_byte() == Some(b'>');
                    if closes {
                        self.tokenizer.advance(1);
                    }
                    break closes;
                }
                TokenKind::CloseAngle => break false,
                TokenKind::Text => self.read_attribute(&mut element, token.text),
                _ => {}
            }
        };

        if self_closing {
            return element;
        }

        loop {
            let token = self.tokenizer.next_token();
            match token.kind {
                TokenKind::Eof => {
                    self.truncated(&element);
                    return element;
                }
                TokenKind::OpenAngle if self.tokenizer.current_byte() == Some(b'/') => {
                    self.tokenizer.advance(1);
                    self.read_closing_tag(&element);
                    return element;
                }
                TokenKind::OpenAngle => {
                    let child = ensure_sufficient_stack(|| self.read_element_inner(true));
                    self.push_child(&mut element, child);
                }
                _ => self.append_text(&mut element, token.text),
            }
        }
    }

    /// Check the name and `>` of a closing tag whose `</` is consumed.
    fn read_closing_tag(&mut self, element: &Element<'src>) {
        let closing = self.tokenizer.next_token();
        if closing.is_text() && closing.text == element.name() {
            if self.tokenizer.next_token().kind != TokenKind::CloseAngle {
                self.report(
                    DiagnosticKind::NoClosingSymbolFound,
                    None,
                    Some(closing.text),
                );
            }
        } else {
            // The token after a mismatched name is left for the parent.
            self.report(
                DiagnosticKind::MismatchedClosingTag,
                Some(element.name()),
                Some(closing.text),
            );
        }
    }

    /// Parse `= value` after the attribute `name` and store it on `target`.
    pub fn read_attribute(&mut self, target: &mut Element<'src>, name: &'src [u8]) {
        if self.tokenizer.next_token().kind != TokenKind::Equals {
            self.report(DiagnosticKind::MissingEqualsSign, None, Some(name));
            return;
        }
        let value = self.tokenizer.next_token();
        if !value.is_text() {
            self.report(DiagnosticKind::MissingAttributeValue, None, Some(name));
            return;
        }
        if !self.charge(value.text.len()) {
            return;
        }
        // Last write wins; the replaced value is no longer held.
        if let Some(previous) = target.set_attribute(name, value.text) {
            self.release(previous.len());
        }
    }

    fn push_child(&mut self, element: &mut Element<'src>, child: Element<'src>) {
        if self.charge(size_of::<Element<'src>>()) {
            element.push_child(child);
        } else {
            self.release(charged_for(&child));
        }
    }

    fn append_text(&mut self, element: &mut Element<'src>, fragment: &'src [u8]) {
        let cost = match &element.text {
            Cow::Borrowed(text) if text.is_empty() => 0,
            Cow::Borrowed(_) => element.text_len_after_append(fragment),
            Cow::Owned(_) => fragment.len() + 1,
        };
        if self.charge(cost) {
            element.append_text(fragment);
        }
    }

    /// Ask the context for `bytes`. Remembers the first refusal.
    fn charge(&mut self, bytes: usize) -> bool {
        match self.context.allocate(bytes) {
            Ok(()) => {
                self.charged += bytes;
                true
            }
            Err(err) => {
                debug!(%err, "allocation refused, value dropped");
                self.allocation_failure.get_or_insert(err);
                false
            }
        }
    }

    fn release(&mut self, bytes: usize) {
        self.context.release(bytes);
        self.charged = self.charged.saturating_sub(bytes);
    }

    fn truncated(&mut self, element: &Element<'src>) {
        if self.options.truncation == TruncationPolicy::Strict {
            self.report(
                DiagnosticKind::UnexpectedEndOfInput,
                None,
                Some(element.name()),
            );
        }
    }

    fn report(&mut self, kind: DiagnosticKind, expected: Option<&[u8]>, actual: Option<&[u8]>) {
        let position = Tokenizer::position(self.tokenizer);
        self.diagnostics.report(kind, expected, actual, position);
    }
}

/// Bytes a parser charged for `element` and everything below it.
fn charged_for(element: &Element<'_>) -> usize {
    element
        .descendants()
        .map(|e| {
            let values: usize = e.attributes.iter().map(|(_, value)| value.len()).sum();
            let text = match &e.text {
                Cow::Owned(text) => text.len(),
                Cow::Borrowed(_) => 0,
            };
            values + text + e.child_count() * size_of::<Element<'_>>()
        })
        .sum()
}

impl Drop for Parser<'_, '_> {
    fn drop(&mut self) {
        self.context.release(self.footprint);
    }
}

//! Token types for the markup scanner.

use std::fmt;

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<`
    OpenAngle,
    /// `>`
    CloseAngle,
    /// `/`
    Slash,
    /// `=`
    Equals,
    /// A run of text, either bare (`name`) or quoted (`"a value"`).
    /// Quoted text does not include the quotes.
    Text,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Upper-case name used when printing tokens.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::OpenAngle => "OPEN_ANGLE",
            TokenKind::CloseAngle => "CLOSE_ANGLE",
            TokenKind::Slash => "SLASH",
            TokenKind::Equals => "EQUALS",
            TokenKind::Text => "TEXT",
            TokenKind::Eof => "EOF",
        }
    }
}

/// A token with its kind, span, and the bytes it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source buffer.
    pub span: Span,
    /// The source bytes of this token.
    pub text: &'src [u8],
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, text: &'src [u8]) -> Self {
        Self { kind, span, text }
    }

    /// Whether this is a text token.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == TokenKind::Text
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TOKEN{{{}, '{}'}}",
            self.kind.name(),
            String::from_utf8_lossy(self.text)
        )
    }
}

//! Tokenizer for tagtree markup.

use crate::{Position, Span, Token, TokenKind};
use tracing::trace;

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";
const INSTRUCTION_START: &[u8] = b"<?";
const INSTRUCTION_END: &[u8] = b"?>";

/// A tokenizer that produces tokens from a markup byte buffer.
///
/// The buffer is borrowed and never copied; token text points into it.
#[derive(Debug, Clone)]
pub struct Tokenizer<'src> {
    /// The source bytes being tokenized.
    source: &'src [u8],
    /// Current byte position in `source`. Never exceeds `source.len()`.
    pos: usize,
    /// Current line, 1-based.
    line: u32,
    /// Current column, 1-based.
    column: u32,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given buffer.
    pub fn new(source: &'src [u8]) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current byte offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Current offset, line and column.
    #[inline]
    pub fn position(&self) -> Position {
        Position {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The byte under the cursor, or `None` at end of input.
    #[inline]
    pub fn current_byte(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    /// The byte `offset` positions ahead of the cursor, without consuming.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos.checked_add(offset)?).copied()
    }

    /// Consume `count` bytes, keeping line and column in step.
    ///
    /// Stops at the end of the buffer, so advancing past the end just
    /// leaves the tokenizer at EOF.
    pub fn advance(&mut self, count: usize) {
        let end = self.pos.saturating_add(count).min(self.source.len());
        for &b in &self.source[self.pos..end] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    /// Step back over the byte that was just consumed.
    ///
    /// Only valid right after consuming a single byte that was not a newline.
    fn rewind(&mut self) {
        debug_assert!(self.pos > 0);
        debug_assert_ne!(self.source[self.pos - 1], b'\n');
        self.pos -= 1;
        self.column -= 1;
    }

    /// Check if the remaining input starts with `literal`, without consuming.
    #[inline]
    pub fn matches_literal(&self, literal: &[u8]) -> bool {
        self.source[self.pos..].starts_with(literal)
    }

    /// Skip whitespace, comments, `<!...>` declarations and `<?...?>`
    /// processing instructions, in any order and any number.
    ///
    /// Unterminated constructs are skipped up to the end of the input.
    pub fn skip_non_content(&mut self) {
        while let Some(b) = self.current_byte() {
            if is_whitespace(b) {
                self.advance(1);
            } else if self.matches_literal(COMMENT_START) {
                self.advance(COMMENT_START.len());
                self.skip_through(COMMENT_END);
            } else if b == b'<' && self.peek(1) == Some(b'!') {
                self.advance(2);
                while let Some(b) = self.current_byte() {
                    self.advance(1);
                    if b == b'>' {
                        break;
                    }
                }
            } else if self.matches_literal(INSTRUCTION_START) {
                self.advance(INSTRUCTION_START.len());
                self.skip_through(INSTRUCTION_END);
            } else {
                break;
            }
        }
    }

    /// Consume everything up to and including `terminator`, or to the end.
    fn skip_through(&mut self, terminator: &[u8]) {
        while !self.is_eof() && !self.matches_literal(terminator) {
            self.advance(1);
        }
        // No-op at EOF.
        self.advance(terminator.len());
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: usize) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = &self.source[start..self.pos];
        trace!(
            "Token {:?} at {:?}: {:?}",
            kind,
            span,
            String::from_utf8_lossy(text)
        );
        Token::new(kind, span, text)
    }

    /// Get the next token.
    ///
    /// Once the input is exhausted this keeps returning [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Token<'src> {
        self.skip_non_content();

        let Some(c) = self.current_byte() else {
            return self.token(TokenKind::Eof, self.pos);
        };

        let start = self.pos;
        self.advance(1);

        match c {
            b'<' => self.token(TokenKind::OpenAngle, start),
            b'>' => self.token(TokenKind::CloseAngle, start),
            b'/' => self.token(TokenKind::Slash, start),
            b'=' => self.token(TokenKind::Equals, start),
            b'"' => self.tokenize_quoted_text(),
            _ => {
                self.rewind();
                self.tokenize_bare_text()
            }
        }
    }

    /// Tokenize quoted text. The opening quote has already been consumed.
    ///
    /// The token covers the bytes between the quotes. A missing closing
    /// quote is not an error here: the text simply runs to the end.
    fn tokenize_quoted_text(&mut self) -> Token<'src> {
        let start = self.pos;
        while let Some(b) = self.current_byte() {
            if b == b'"' {
                break;
            }
            self.advance(1);
        }
        let token = self.token(TokenKind::Text, start);
        // Closing quote, if any.
        self.advance(1);
        token
    }

    /// Tokenize bare text: everything up to whitespace or `< > = /`.
    fn tokenize_bare_text(&mut self) -> Token<'src> {
        let start = self.pos;
        while let Some(b) = self.current_byte() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.advance(1);
        }
        self.token(TokenKind::Text, start)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Bytes that end a run of bare text.
#[inline]
fn is_delimiter(b: u8) -> bool {
    matches!(b, b'<' | b'>' | b'=' | b'/')
}

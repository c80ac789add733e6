#![doc = include_str!("../README.md")]

mod span;
pub use span::{Position, Span};

mod token;
pub use token::{Token, TokenKind};

mod tokenizer;
pub use tokenizer::Tokenizer;

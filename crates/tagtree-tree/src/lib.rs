#![doc = include_str!("../README.md")]

mod attributes;
mod context;
mod element;
mod stack;

pub use attributes::Attributes;
pub use context::{AllocError, Budget, Global, MemoryContext};
pub use element::{Descendants, Element};
pub use stack::ensure_sufficient_stack;

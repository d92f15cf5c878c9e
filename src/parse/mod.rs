//! Reference parser integration.
//!
//! Wraps a tree-sitter Ruby parser behind the two contract calls the
//! search engine needs: `valid?` on a text and `valid_without?` on a
//! document with line ranges redacted.

pub mod errors;
pub mod parser;
pub mod validator;

pub use errors::ParserError;
pub use parser::{ErrorNode, ParsedSource, RubyParser};

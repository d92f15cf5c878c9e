//! Thread-local parser pooling.
//!
//! A search runs hundreds of validity probes; constructing a
//! tree-sitter parser for each would dominate the cost. Each thread
//! keeps one parser in a slot and checks it out per call.

use std::cell::Cell;

use crate::parse::{ParserError, RubyParser};

thread_local! {
    static POOL: Cell<Option<RubyParser>> = const { Cell::new(None) };
}

/// Run `f` with this thread's pooled parser.
///
/// The parser is checked out of the slot for the duration of the call
/// and returned afterwards. The first use on a thread builds the
/// parser; a reentrant call while one is checked out builds a second
/// instead of failing, and whichever returns last keeps the slot.
pub fn with_parser<F, R>(f: F) -> Result<R, ParserError>
where
    F: FnOnce(&mut RubyParser) -> R,
{
    POOL.with(|slot| {
        let mut parser = match slot.take() {
            Some(pooled) => pooled,
            None => RubyParser::new()?,
        };
        let outcome = f(&mut parser);
        slot.set(Some(parser));
        Ok(outcome)
    })
}

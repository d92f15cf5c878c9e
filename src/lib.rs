//! Block Probe: localizes unclosed or mismatched block syntax in Ruby
//! sources.
//!
//! Given a file the reference parser rejects, the search returns a
//! minimal set of contiguous line ranges whose removal makes the
//! remainder parse cleanly. Those ranges are the human-meaningful
//! suspect regions: a missing `end`, an unterminated block, a stray
//! keyword.
//!
//! # Architecture
//!
//! The engine is an indentation-directed tree builder coupled to a
//! frontier of suspect blocks:
//!
//! - every line becomes a leaf block carrying its lexical open/close
//!   differential ([`lex`]);
//! - a priority queue grows candidate blocks from high-indent leaves
//!   outward along the document spine ([`block`], [`search`]);
//! - finished invalid blocks land in the frontier, which evicts
//!   engulfed candidates through an interval index ([`frontier`],
//!   [`itree`]);
//! - the search stops once reparsing the document without the frontier
//!   succeeds, and a selector narrows the survivors to the smallest
//!   culprit set ([`search::selector`]).
//!
//! Validity questions are answered by a tree-sitter Ruby parser
//! ([`parse`]), pooled per thread ([`pool`]).
//!
//! # Example
//!
//! ```no_run
//! let source = "def foo\n  1 +\nend\n";
//! match block_probe::search(source) {
//!     Ok(ranges) => {
//!         for range in ranges {
//!             println!("suspect lines {}..{}", range.start, range.end);
//!         }
//!     }
//!     Err(e) => eprintln!("search failed: {}", e),
//! }
//! ```

pub mod block;
pub mod clean;
pub mod frontier;
pub mod itree;
pub mod lex;
pub mod line;
pub mod parse;
pub mod pool;
pub mod search;

// Re-exports
pub use block::{BlockDocument, BlockNode, NodeId};
pub use frontier::{CodeBlock, CodeFrontier};
pub use itree::{BinaryIntervalTree, RangeCmp, RangeCmpRev};
pub use lex::{Leaning, LexPairDiff, PairKind};
pub use line::{CodeLine, CodeLines};
pub use parse::{ParserError, RubyParser};
pub use search::{search, CodeSearch, IndentTree, SearchError, SearchOptions, SuspectRange};

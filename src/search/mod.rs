//! Top-level search: grow candidate blocks from high-indent leaves
//! outward, feed maximal invalid blocks to the frontier, and stop once
//! redacting the frontier makes the rest of the document parse.

pub mod indent_tree;
pub mod selector;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::block::BlockDocument;
use crate::frontier::{CodeBlock, CodeFrontier};
use crate::lex::LexError;
use crate::line::CodeLines;
use crate::parse::{validator, ParserError};
use crate::search::indent_tree::{step, StepOutcome};
use crate::search::selector::{InvalidBlockSelector, MAX_SUBSET_SIZE};

pub use indent_tree::IndentTree;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("lexing failed: {0}")]
    Lex(#[from] LexError),

    #[error("reference parser unavailable: {0}")]
    Parser(#[from] ParserError),
}

/// One suspect region, 1-based inclusive line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuspectRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Cap on the selector's subset enumeration.
    pub max_subset_size: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_subset_size: MAX_SUBSET_SIZE,
        }
    }
}

/// Localize block syntax errors in a source string.
///
/// Returns disjoint 1-based line ranges, sorted ascending, whose
/// removal makes the remainder parse. Valid (or blank) input yields an
/// empty result.
pub fn search(source: &str) -> Result<Vec<SuspectRange>, SearchError> {
    CodeSearch::new(source)?.call()
}

pub struct CodeSearch {
    lines: CodeLines,
    document: BlockDocument,
    frontier: CodeFrontier,
    options: SearchOptions,
}

impl CodeSearch {
    pub fn new(source: &str) -> Result<Self, SearchError> {
        Self::with_options(source, SearchOptions::default())
    }

    pub fn with_options(source: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let lines = CodeLines::from_source(source)?;
        let document = BlockDocument::new(lines.clone());
        let frontier = CodeFrontier::new(lines.clone());
        Ok(Self {
            lines,
            document,
            frontier,
            options,
        })
    }

    pub fn call(mut self) -> Result<Vec<SuspectRange>, SearchError> {
        if validator::valid(&self.lines.visible_text_without(&[]))? {
            return Ok(Vec::new());
        }

        while let Some(id) = self.document.pop() {
            match step(&mut self.document, id) {
                StepOutcome::Grew(_) => {}
                StepOutcome::Attached => {
                    let block = CodeBlock::wrap(&mut self.document, id)?;
                    if block.invalid() {
                        self.frontier.push(block);
                        if self.frontier.holds_all_syntax_errors()? {
                            debug!("frontier holds all syntax errors");
                            break;
                        }
                    } else {
                        // A finished valid block leaves the document:
                        // its lines stop participating in reparses.
                        self.hide_block(&block);
                    }
                }
            }
        }

        let ranges = InvalidBlockSelector::new(&mut self.document)
            .with_max_subset_size(self.options.max_subset_size)
            .select(&self.frontier)?;

        Ok(ranges
            .into_iter()
            .map(|(start, end)| SuspectRange {
                start: start + 1,
                end: end + 1,
            })
            .collect())
    }

    fn hide_block(&mut self, block: &CodeBlock) {
        for index in block.start_index()..=block.end_index() {
            self.lines.get(index).mark_invisible();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_source_yields_no_suspects() {
        let source = "def foo\n  if a\n    b\n  else\n    c\n  end\nend\n";
        assert!(search(source).unwrap().is_empty());
    }

    #[test]
    fn blank_source_yields_no_suspects() {
        assert!(search("").unwrap().is_empty());
        assert!(search("\n\n\n").unwrap().is_empty());
        assert!(search("# only comments\n# here\n").unwrap().is_empty());
    }

    #[test]
    fn missing_end_is_pinned_to_the_opening_line() {
        let source = "def on_args_add(arguments, argument)\n  if arguments.parts.empty?\n    Args.new(parts: [argument])\n  else\n    Args.new(parts: arguments.parts << argument)\n  end\n# end missing here\n\nclass Bar\nend\n";
        let ranges = search(source).unwrap();
        assert_eq!(ranges, vec![SuspectRange { start: 1, end: 1 }]);
    }

    #[test]
    fn stray_outer_end_is_pinned_to_its_own_line() {
        let source = "Foo.call\n  def foo\n    print \"lol\"\n   end\nend\n";
        let ranges = search(source).unwrap();
        assert_eq!(ranges, vec![SuspectRange { start: 5, end: 5 }]);
    }

    #[test]
    fn extra_end_inside_a_def() {
        let source = "def foo\n  end # one\nend # two\n";
        let ranges = search(source).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, ranges[0].end);
    }

    #[test]
    fn results_are_sorted_and_disjoint() {
        let source = "def alpha\n  a\n\ndef beta\n  b\nend\n";
        let ranges = search(source).unwrap();
        for window in ranges.windows(2) {
            assert!(window[0].end < window[1].start);
        }
    }

    #[test]
    fn unterminated_string_is_localized() {
        let source = "x = 1\nputs \"oops\ny = 2\n";
        let ranges = search(source).unwrap();
        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].start <= 2 && 2 <= ranges[0].end);
    }
}

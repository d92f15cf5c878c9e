//! The frontier: candidate suspect blocks under active investigation.
//!
//! Backed by an insertion-sorted vector (indent, then start) and an
//! interval tree over line ranges. Pushing a block evicts every live
//! block it engulfs, so no live block's range ever strictly contains
//! another's.

use tracing::debug;

use crate::block::{BlockDocument, NodeId};
use crate::itree::{BinaryIntervalTree, RangeCmp};
use crate::line::CodeLines;
use crate::parse::{validator, ParserError};

/// A suspect block snapshot handed to the frontier.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    node: NodeId,
    start_index: u32,
    end_index: u32,
    indent: u32,
    invalid: bool,
    deleted: bool,
}

impl CodeBlock {
    /// Snapshot a document node, probing (and memoizing) its validity.
    pub fn wrap(document: &mut BlockDocument, id: NodeId) -> Result<Self, ParserError> {
        let invalid = !document.node_valid(id)?;
        let node = document.node(id);
        Ok(Self {
            node: id,
            start_index: node.start_index(),
            end_index: node.end_index(),
            indent: node.indent(),
            invalid,
            deleted: false,
        })
    }

    #[cfg(test)]
    fn stub(start_index: u32, end_index: u32, invalid: bool) -> Self {
        Self {
            node: NodeId(0),
            start_index,
            end_index,
            indent: 0,
            invalid,
            deleted: false,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    pub fn end_index(&self) -> u32 {
        self.end_index
    }

    pub fn range(&self) -> (u32, u32) {
        (self.start_index, self.end_index)
    }

    pub fn indent(&self) -> u32 {
        self.indent
    }

    pub fn invalid(&self) -> bool {
        self.invalid
    }

    fn key(&self) -> RangeCmp {
        RangeCmp::new(self.start_index, self.end_index)
    }
}

pub struct CodeFrontier {
    lines: CodeLines,
    /// Insertion-sorted by (indent, start); deleted entries are
    /// compacted lazily from the tail.
    blocks: Vec<CodeBlock>,
    tree: BinaryIntervalTree<NodeId>,
    /// Cleared by each holds-check; set again only when an invalid
    /// block arrives, so redundant reparses are skipped.
    check_next: bool,
}

impl CodeFrontier {
    pub fn new(lines: CodeLines) -> Self {
        Self {
            lines,
            blocks: Vec::new(),
            tree: BinaryIntervalTree::new(),
            check_next: false,
        }
    }

    /// Add a suspect block, evicting every live block it engulfs.
    pub fn push(&mut self, block: CodeBlock) {
        let key = block.key();
        self.tree.push(key, block.node);

        for (engulfed, _) in self.tree.search_contains_key(key) {
            if engulfed == key {
                continue;
            }
            self.tree.delete(engulfed);
            for entry in &mut self.blocks {
                if !entry.deleted && entry.key() == engulfed {
                    entry.deleted = true;
                }
            }
        }

        while self.blocks.last().is_some_and(|entry| entry.deleted) {
            self.blocks.pop();
        }

        if block.invalid {
            self.check_next = true;
        }

        debug!(
            start = block.start_index,
            end = block.end_index,
            invalid = block.invalid,
            live = self.tree.len(),
            "frontier push"
        );

        let at = self
            .blocks
            .partition_point(|entry| (entry.indent, entry.start_index) < (block.indent, block.start_index));
        self.blocks.insert(at, block);
    }

    /// Does redacting every live frontier block leave a document the
    /// reference parser accepts? Skipped (false) unless an invalid
    /// block was pushed since the last check.
    pub fn holds_all_syntax_errors(&mut self) -> Result<bool, ParserError> {
        if !self.check_next {
            return Ok(false);
        }
        self.check_next = false;
        let without = self.live_ranges();
        validator::valid_without(&without, &self.lines)
    }

    /// Inclusive line ranges of all live blocks, in source order.
    pub fn live_ranges(&self) -> Vec<(u32, u32)> {
        let mut ranges: Vec<(u32, u32)> = self
            .blocks
            .iter()
            .filter(|entry| !entry.deleted)
            .map(|entry| entry.range())
            .collect();
        ranges.sort_unstable();
        ranges
    }

    /// Live invalid blocks, in source order.
    pub fn invalid_blocks(&self) -> Vec<&CodeBlock> {
        let mut blocks: Vec<&CodeBlock> = self
            .blocks
            .iter()
            .filter(|entry| !entry.deleted && entry.invalid)
            .collect();
        blocks.sort_by_key(|entry| entry.start_index);
        blocks
    }

    pub fn live_len(&self) -> usize {
        self.tree.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier(source: &str) -> CodeFrontier {
        CodeFrontier::new(CodeLines::from_source(source).unwrap())
    }

    #[test]
    fn engulfing_block_evicts_smaller_ones() {
        let mut frontier = frontier(&"x = 1\n".repeat(25));
        frontier.push(CodeBlock::stub(1, 1, true));
        frontier.push(CodeBlock::stub(5, 5, true));
        frontier.push(CodeBlock::stub(11, 11, true));
        assert_eq!(frontier.live_len(), 3);

        frontier.push(CodeBlock::stub(0, 20, true));
        assert_eq!(frontier.live_len(), 1);
        assert_eq!(frontier.live_ranges(), vec![(0, 20)]);
    }

    #[test]
    fn no_live_block_strictly_contains_another() {
        let mut frontier = frontier(&"x = 1\n".repeat(40));
        let pushes = [(3, 7), (1, 1), (10, 12), (0, 8), (10, 12), (9, 30)];
        for &(start, end) in &pushes {
            frontier.push(CodeBlock::stub(start, end, false));
            let ranges = frontier.live_ranges();
            for &a in &ranges {
                for &b in &ranges {
                    if a != b {
                        let outer = RangeCmp::new(a.0, a.1);
                        let inner = RangeCmp::new(b.0, b.1);
                        assert!(!outer.engulfs(&inner), "{:?} engulfs {:?}", a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn holds_check_is_skipped_without_new_invalid_blocks() {
        let mut frontier = frontier("end\nx = 1\n");
        frontier.push(CodeBlock::stub(1, 1, false));
        // Only a valid block was pushed; the check short-circuits even
        // though redacting would not fix anything.
        assert!(!frontier.holds_all_syntax_errors().unwrap());
    }

    #[test]
    fn holds_check_fires_after_an_invalid_block() {
        let mut frontier = frontier("end\nx = 1\n");
        frontier.push(CodeBlock::stub(0, 0, true));
        assert!(frontier.holds_all_syntax_errors().unwrap());
        // The flag was consumed; a second call without new pushes skips.
        assert!(!frontier.holds_all_syntax_errors().unwrap());
    }

    #[test]
    fn holds_check_rejects_when_errors_remain_outside() {
        let mut frontier = frontier("def foo\nend\nend\nend\n");
        frontier.push(CodeBlock::stub(2, 2, true));
        // One stray end is redacted but another remains.
        assert!(!frontier.holds_all_syntax_errors().unwrap());
    }

    #[test]
    fn invalid_blocks_lists_only_live_invalid_entries() {
        let mut frontier = frontier(&"x = 1\n".repeat(25));
        frontier.push(CodeBlock::stub(2, 2, true));
        frontier.push(CodeBlock::stub(8, 9, false));
        frontier.push(CodeBlock::stub(1, 3, true));
        let ranges: Vec<(u32, u32)> = frontier
            .invalid_blocks()
            .iter()
            .map(|b| b.range())
            .collect();
        assert_eq!(ranges, vec![(1, 3)]);
    }
}

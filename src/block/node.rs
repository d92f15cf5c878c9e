use crate::lex::{Leaning, LexPairDiff};

/// Index into the document's node arena. `u32` supports ~4 billion
/// nodes, far beyond any source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A block spanning a contiguous line range.
///
/// `start_index`, `end_index`, `indent`, `lex_diff`, and `parents` are
/// write-once; only the spine links, the tombstone, and the two lazy
/// memos mutate after construction. All access goes through the owning
/// [`BlockDocument`](crate::block::BlockDocument)'s arena.
#[derive(Debug)]
pub struct BlockNode {
    pub(crate) start_index: u32,
    pub(crate) end_index: u32,
    /// Minimum indent among non-empty member lines at construction
    /// time; stable regardless of later neighbour changes.
    pub(crate) indent: u32,
    pub(crate) lex_diff: LexPairDiff,
    /// Nodes this one was composed from; empty for a leaf.
    pub(crate) parents: Vec<NodeId>,
    pub(crate) above: Option<NodeId>,
    pub(crate) below: Option<NodeId>,
    /// Tombstone; deleted nodes linger in the queue and are skipped
    /// lazily on pop.
    pub(crate) deleted: bool,
    /// Set once at enqueue time, never cleared.
    pub(crate) next_indent: Option<u32>,
    /// Memoized reference-parser verdict for this block's text.
    pub(crate) valid: Option<bool>,
}

impl BlockNode {
    pub(crate) fn leaf(index: u32, indent: u32, lex_diff: LexPairDiff) -> Self {
        Self {
            start_index: index,
            end_index: index,
            indent,
            lex_diff,
            parents: Vec::new(),
            above: None,
            below: None,
            deleted: false,
            next_indent: None,
            valid: None,
        }
    }

    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    pub fn end_index(&self) -> u32 {
        self.end_index
    }

    /// Inclusive `(start, end)` line range.
    pub fn range_tuple(&self) -> (u32, u32) {
        (self.start_index, self.end_index)
    }

    pub fn indent(&self) -> u32 {
        self.indent
    }

    pub fn lex_diff(&self) -> &LexPairDiff {
        &self.lex_diff
    }

    pub fn leaning(&self) -> Leaning {
        self.lex_diff.leaning()
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn above(&self) -> Option<NodeId> {
        self.above
    }

    pub fn below(&self) -> Option<NodeId> {
        self.below
    }

    pub fn is_leaf(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn deleted(&self) -> bool {
        self.deleted
    }
}

/// Queue priority: `(next_indent, indent, end_index)` ascending; the
/// queue pops the maximum, so deeper candidates resolve first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    pub next_indent: u32,
    pub indent: u32,
    pub end_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_parents_and_spans_one_line() {
        let node = BlockNode::leaf(4, 2, LexPairDiff::new_empty());
        assert!(node.is_leaf());
        assert_eq!(node.start_index(), 4);
        assert_eq!(node.end_index(), 4);
        assert_eq!(node.leaning(), Leaning::Equal);
    }

    #[test]
    fn priority_orders_by_next_indent_then_indent_then_end() {
        let low = PriorityKey {
            next_indent: 0,
            indent: 4,
            end_index: 9,
        };
        let high = PriorityKey {
            next_indent: 2,
            indent: 0,
            end_index: 0,
        };
        assert!(low < high);

        let tie_a = PriorityKey {
            next_indent: 2,
            indent: 2,
            end_index: 3,
        };
        let tie_b = PriorityKey {
            next_indent: 2,
            indent: 2,
            end_index: 5,
        };
        assert!(tie_a < tie_b);
    }
}

//! The document spine: an arena of block nodes linked above/below,
//! plus the expansion queue and the root sentinel that accumulates
//! finished top-level blocks.

use tracing::trace;

use crate::block::node::{BlockNode, NodeId, PriorityKey};
use crate::block::queue::NodeQueue;
use crate::lex::{Leaning, LexPairDiff};
use crate::line::CodeLines;
use crate::parse::{validator, ParserError};

pub struct BlockDocument {
    lines: CodeLines,
    arena: Vec<BlockNode>,
    root: NodeId,
    queue: NodeQueue,
}

impl BlockDocument {
    /// Build the leaf spine: one node per line, linked in order, every
    /// leaf enqueued.
    pub fn new(lines: CodeLines) -> Self {
        let line_count = lines.len() as u32;
        let mut arena = Vec::with_capacity(lines.len() + 1);
        arena.push(BlockNode::leaf(0, 0, LexPairDiff::new_empty()));
        let root = NodeId(0);
        if line_count > 0 {
            arena[0].end_index = line_count - 1;
        }

        let mut document = Self {
            lines,
            arena,
            root,
            queue: NodeQueue::new(),
        };

        for index in 0..line_count {
            let line = document.lines.get(index);
            let node = BlockNode::leaf(index, line.indent(), line.lex_diff().clone());
            document.arena.push(node);
        }
        for index in 0..line_count {
            let id = NodeId(index + 1);
            let above = (index > 0).then(|| NodeId(index));
            let below = (index + 1 < line_count).then(|| NodeId(index + 2));
            let node = document.node_mut(id);
            node.above = above;
            node.below = below;
        }
        for index in 0..line_count {
            document.enqueue(NodeId(index + 1));
        }
        document
    }

    pub fn lines(&self) -> &CodeLines {
        &self.lines
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &BlockNode {
        &self.arena[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut BlockNode {
        &mut self.arena[id.index()]
    }

    /// Next live candidate, skipping tombstones lazily.
    pub fn pop(&mut self) -> Option<NodeId> {
        while let Some(id) = self.queue.pop() {
            if !self.node(id).deleted {
                return Some(id);
            }
        }
        None
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Compose `parents` into one block, splice it into the spine, and
    /// enqueue it. Every parent is tombstoned.
    pub fn capture(&mut self, parents: Vec<NodeId>) -> NodeId {
        let parents = self.unwrap_single(parents);
        debug_assert!(!parents.is_empty());
        debug_assert!(parents
            .windows(2)
            .all(|w| self.node(w[0]).end_index + 1 == self.node(w[1]).start_index));

        let first = *parents.first().expect("non-empty parents");
        let last = *parents.last().expect("non-empty parents");
        let start_index = self.node(first).start_index;
        let end_index = self.node(last).end_index;
        let above = self.node(first).above;
        let below = self.node(last).below;

        let mut lex_diff = LexPairDiff::new_empty();
        for &parent in &parents {
            lex_diff.concat(&self.node(parent).lex_diff);
        }

        for &parent in &parents {
            self.node_mut(parent).deleted = true;
        }

        // A sole leaf parent yields a leaf-equivalent composite.
        let stored_parents = if parents.len() == 1 {
            Vec::new()
        } else {
            parents
        };

        let id = NodeId(self.arena.len() as u32);
        self.arena.push(BlockNode {
            start_index,
            end_index,
            indent: self.range_indent(start_index, end_index),
            lex_diff,
            parents: stored_parents,
            above,
            below,
            deleted: false,
            next_indent: None,
            valid: None,
        });

        if let Some(above) = above {
            self.node_mut(above).below = Some(id);
        }
        if let Some(below) = below {
            self.node_mut(below).above = Some(id);
        }

        self.enqueue(id);
        trace!(
            start = start_index,
            end = end_index,
            indent = self.node(id).indent,
            "captured block"
        );
        id
    }

    /// Never create single-child composites: a lone composite parent
    /// is unwrapped into its own parents, recursively.
    fn unwrap_single(&self, mut parents: Vec<NodeId>) -> Vec<NodeId> {
        while parents.len() == 1 {
            let sole = parents[0];
            if self.node(sole).parents.is_empty() {
                break;
            }
            parents = self.node(sole).parents.clone();
        }
        parents
    }

    /// Minimum indent over the non-empty lines of a range; 0 when the
    /// range is all blank.
    fn range_indent(&self, start_index: u32, end_index: u32) -> u32 {
        (start_index..=end_index)
            .map(|index| self.lines.get(index))
            .filter(|line| !line.empty())
            .map(|line| line.indent())
            .min()
            .unwrap_or(0)
    }

    /// Compute the node's priority and put it on the queue. The
    /// `next_indent` memo is set here, once, so the stored priority and
    /// later driver decisions agree.
    fn enqueue(&mut self, id: NodeId) {
        let next_indent = self.compute_next_indent(id);
        let node = self.node_mut(id);
        node.next_indent = Some(next_indent);
        let key = PriorityKey {
            next_indent,
            indent: node.indent,
            end_index: node.end_index,
        };
        self.queue.push(key, id);
    }

    /// The memoized expansion tier for a node, set at enqueue time.
    pub fn next_indent(&self, id: NodeId) -> u32 {
        let node = self.node(id);
        node.next_indent.unwrap_or(node.indent)
    }

    /// The indent at which the node would capture both neighbours:
    /// its own indent while an expansion still fires, otherwise the
    /// shallowest neighbour tier, clamped to its own indent.
    fn compute_next_indent(&self, id: NodeId) -> u32 {
        let node = self.node(id);
        if self.expand_above(id, node.indent) || self.expand_below(id, node.indent) {
            return node.indent;
        }
        let above = node.above.map(|a| self.node(a).indent);
        let below = node.below.map(|b| self.node(b).indent);
        let tier = match (above, below) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => node.indent,
        };
        tier.min(node.indent)
    }

    /// Can this node capture its `above` neighbour at the given tier?
    pub fn expand_above(&self, id: NodeId, with_indent: u32) -> bool {
        let node = self.node(id);
        let Some(above_id) = node.above else {
            return false;
        };
        let above = self.node(above_id);
        // A right-leaning leaf above must first capture downward.
        if above.is_leaf() && above.leaning() == Leaning::Right {
            return false;
        }
        if node.is_leaf() {
            match node.leaning() {
                Leaning::Left => return false,
                Leaning::Both if above.leaning() == Leaning::Left => return true,
                _ => {}
            }
        }
        match above.leaning() {
            Leaning::Left | Leaning::Both => above.indent >= with_indent,
            Leaning::Equal
                if node.leaning() == Leaning::Equal
                    && !node.is_leaf()
                    && !above.is_leaf()
                    && above.indent == with_indent =>
            {
                // Two finished siblings at the same tier stay siblings.
                false
            }
            _ => true,
        }
    }

    /// Mirror image of [`expand_above`](Self::expand_above).
    pub fn expand_below(&self, id: NodeId, with_indent: u32) -> bool {
        let node = self.node(id);
        let Some(below_id) = node.below else {
            return false;
        };
        let below = self.node(below_id);
        // A left-leaning leaf below must first capture upward.
        if below.is_leaf() && below.leaning() == Leaning::Left {
            return false;
        }
        if node.is_leaf() {
            match node.leaning() {
                Leaning::Right => return false,
                Leaning::Both if below.leaning() == Leaning::Right => return true,
                _ => {}
            }
        }
        match below.leaning() {
            Leaning::Right | Leaning::Both => below.indent >= with_indent,
            Leaning::Equal
                if node.leaning() == Leaning::Equal
                    && !node.is_leaf()
                    && !below.is_leaf()
                    && below.indent == with_indent =>
            {
                false
            }
            _ => true,
        }
    }

    /// File a maximal block under the root sentinel. A block spanning
    /// the whole document hands its parents to the root directly so
    /// the tree never ends in a single-child chain.
    pub fn attach_to_root(&mut self, id: NodeId) {
        let line_count = self.lines.len() as u32;
        let node = self.node(id);
        let whole_document = line_count > 0
            && node.start_index == 0
            && node.end_index == line_count - 1
            && !node.parents.is_empty();

        if whole_document {
            let adopted = node.parents.clone();
            self.node_mut(id).deleted = true;
            self.node_mut(self.root).parents = adopted;
        } else {
            let start = node.start_index;
            let end = node.end_index;
            // An earlier top-level block may have been captured into
            // this one since it was filed; it yields its place.
            let mut parents = std::mem::take(&mut self.node_mut(self.root).parents);
            parents.retain(|&p| {
                let parent = self.node(p);
                !(start <= parent.start_index && parent.end_index <= end)
            });
            // Keep root parents in source order.
            let insert_at = parents
                .iter()
                .position(|&p| self.node(p).start_index > start)
                .unwrap_or(parents.len());
            parents.insert(insert_at, id);
            self.node_mut(self.root).parents = parents;
        }
        trace!(node = id.0, "attached to root");
    }

    pub fn root_parents(&self) -> &[NodeId] {
        &self.arena[self.root.index()].parents
    }

    /// Aggregate leaning of the root's parents, in source order.
    pub fn root_leaning(&self) -> Leaning {
        let mut diff = LexPairDiff::new_empty();
        let mut parents: Vec<NodeId> = self.root_parents().to_vec();
        parents.sort_by_key(|&p| self.node(p).start_index);
        for parent in parents {
            diff.concat(&self.node(parent).lex_diff);
        }
        diff.leaning()
    }

    /// Memoized reference-parser verdict for a node's text.
    pub fn node_valid(&mut self, id: NodeId) -> Result<bool, ParserError> {
        if let Some(valid) = self.node(id).valid {
            return Ok(valid);
        }
        let (start, end) = {
            let node = self.node(id);
            (node.start_index, node.end_index)
        };
        let text = self.lines.block_text(start, end);
        let valid = validator::valid(&text)?;
        self.node_mut(id).valid = Some(valid);
        Ok(valid)
    }

    /// Snapshot of live non-sentinel nodes in source order.
    pub fn to_a(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (1..self.arena.len() as u32)
            .map(NodeId)
            .filter(|&id| !self.node(id).deleted)
            .collect();
        ids.sort_by_key(|&id| self.node(id).start_index);
        ids
    }

    /// Walk the spine via neighbour links, for invariant checks.
    pub fn spine(&self) -> Vec<NodeId> {
        let mut head = None;
        for id in (1..self.arena.len() as u32).map(NodeId) {
            let node = self.node(id);
            if !node.deleted && node.above.is_none() {
                head = Some(id);
                break;
            }
        }
        let mut out = Vec::new();
        let mut cursor = head;
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id).below;
        }
        out
    }
}

//! The indentation-directed tree driver.
//!
//! Repeatedly pops the deepest candidate and either grows it into a
//! neighbour (per its expansion predicates at its memoized tier) or
//! files it as a finished block under the root sentinel.

use tracing::trace;

use crate::block::{BlockDocument, NodeId};

/// What one driver step did with a popped node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The node was captured into a larger composite.
    Grew(NodeId),
    /// The node was maximal at its tier and attached to the root.
    Attached,
}

/// Run one expansion step on a live popped node. Both sides firing at
/// once capture `[above, node, below]` as a single composite.
pub fn step(document: &mut BlockDocument, id: NodeId) -> StepOutcome {
    let tier = document.next_indent(id);
    let up = document.expand_above(id, tier);
    let down = document.expand_below(id, tier);
    let node = document.node(id);

    let outcome = match (up, down) {
        (true, true) => {
            let above = node.above().expect("expand_above implies a neighbour");
            let below = node.below().expect("expand_below implies a neighbour");
            StepOutcome::Grew(document.capture(vec![above, id, below]))
        }
        (true, false) => {
            let above = node.above().expect("expand_above implies a neighbour");
            StepOutcome::Grew(document.capture(vec![above, id]))
        }
        (false, true) => {
            let below = node.below().expect("expand_below implies a neighbour");
            StepOutcome::Grew(document.capture(vec![id, below]))
        }
        (false, false) => {
            document.attach_to_root(id);
            StepOutcome::Attached
        }
    };
    trace!(node = ?id, ?tier, ?outcome, "driver step");
    outcome
}

/// Drive the document to its finished tree: every leaf ends up
/// reachable from the root through `parents`.
pub struct IndentTree {
    document: BlockDocument,
}

impl IndentTree {
    pub fn new(document: BlockDocument) -> Self {
        Self { document }
    }

    pub fn call(mut self) -> BlockDocument {
        while let Some(id) = self.document.pop() {
            step(&mut self.document, id);
        }
        self.document
    }
}

//! Block nodes, the document spine, and the expansion queue.

pub mod document;
pub mod node;
pub mod queue;

pub use document::BlockDocument;
pub use node::{BlockNode, NodeId, PriorityKey};
pub use queue::NodeQueue;

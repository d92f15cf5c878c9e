//! Interval index used by the frontier to evict engulfed blocks.

pub mod range_cmp;
pub mod tree;

pub use range_cmp::{RangeCmp, RangeCmpRev};
pub use tree::BinaryIntervalTree;

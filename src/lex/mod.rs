//! Lexical balance model: pair kinds, per-line scanning, and the
//! running open/close differential used to classify blocks.

pub mod diff;
pub mod errors;
pub mod kind;
pub mod scanner;

pub use diff::LexPairDiff;
pub use errors::LexError;
pub use kind::{Leaning, PairGroup, PairKind, PairSide, PairToken};
pub use scanner::tokenize;

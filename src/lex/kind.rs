/// The block-structured pair vocabulary the scanner can emit.
///
/// Every keyword-opened block (`do`, `if`, `def`, ...) closes with the
/// literal `end`, so close events cannot name their opener; see
/// [`PairGroup`] for how kinds collapse when balancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    Paren,
    Brace,
    Bracket,
    DoEnd,
    IfEnd,
    DefEnd,
    ClassEnd,
    ModuleEnd,
    BeginEnd,
    CaseEnd,
    StringLit,
    Heredoc,
}

/// Balance group a [`PairKind`] counts under.
///
/// Keyword blocks share one group because `end` is a common closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairGroup {
    Paren,
    Brace,
    Bracket,
    Keyword,
    StringLit,
    Heredoc,
}

impl PairGroup {
    pub(crate) const COUNT: usize = 6;

    pub(crate) fn slot(self) -> usize {
        match self {
            PairGroup::Paren => 0,
            PairGroup::Brace => 1,
            PairGroup::Bracket => 2,
            PairGroup::Keyword => 3,
            PairGroup::StringLit => 4,
            PairGroup::Heredoc => 5,
        }
    }
}

impl PairKind {
    pub fn group(self) -> PairGroup {
        match self {
            PairKind::Paren => PairGroup::Paren,
            PairKind::Brace => PairGroup::Brace,
            PairKind::Bracket => PairGroup::Bracket,
            PairKind::DoEnd
            | PairKind::IfEnd
            | PairKind::DefEnd
            | PairKind::ClassEnd
            | PairKind::ModuleEnd
            | PairKind::BeginEnd
            | PairKind::CaseEnd => PairGroup::Keyword,
            PairKind::StringLit => PairGroup::StringLit,
            PairKind::Heredoc => PairGroup::Heredoc,
        }
    }
}

/// Which side of a pair a token sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Open,
    Close,
}

/// One pair event produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairToken {
    pub kind: PairKind,
    pub side: PairSide,
}

impl PairToken {
    pub fn open(kind: PairKind) -> Self {
        Self {
            kind,
            side: PairSide::Open,
        }
    }

    pub fn close(kind: PairKind) -> Self {
        Self {
            kind,
            side: PairSide::Close,
        }
    }
}

/// Direction of lexical imbalance for a line or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaning {
    /// Balanced on every pair group.
    Equal,
    /// Unclosed openers remain.
    Left,
    /// Unmatched closers remain.
    Right,
    /// Mismatched in both directions.
    Both,
}

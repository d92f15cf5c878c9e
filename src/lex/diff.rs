use crate::lex::kind::{Leaning, PairGroup, PairSide, PairToken};

/// Running count of opening vs. closing pair markers, one pair of
/// counters per balance group.
///
/// Concatenation is ordered: appending `B` onto `A` first cancels `A`'s
/// pending opens against `B`'s closes, then sums the remainders. This
/// captures nesting across line boundaries without tracking a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexPairDiff {
    open: [u32; PairGroup::COUNT],
    close: [u32; PairGroup::COUNT],
}

impl LexPairDiff {
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Fold one scanner event into the diff.
    ///
    /// Returns `false` on counter overflow so the caller can surface
    /// `LexError::Overflow` with its line number.
    pub(crate) fn record(&mut self, token: PairToken) -> bool {
        let slot = token.kind.group().slot();
        let counter = match token.side {
            PairSide::Open => &mut self.open[slot],
            PairSide::Close => &mut self.close[slot],
        };
        match counter.checked_add(1) {
            Some(n) => {
                *counter = n;
                true
            }
            None => false,
        }
    }

    /// Append `other`, cancelling our pending opens against its closes.
    pub fn concat(&mut self, other: &LexPairDiff) {
        for slot in 0..PairGroup::COUNT {
            let cancelled = self.open[slot].min(other.close[slot]);
            self.open[slot] -= cancelled;
            self.open[slot] += other.open[slot];
            self.close[slot] += other.close[slot] - cancelled;
        }
    }

    pub fn balanced(&self) -> bool {
        self.open.iter().all(|&n| n == 0) && self.close.iter().all(|&n| n == 0)
    }

    pub fn leaning(&self) -> Leaning {
        let opens = self.open.iter().any(|&n| n > 0);
        let closes = self.close.iter().any(|&n| n > 0);
        match (opens, closes) {
            (false, false) => Leaning::Equal,
            (true, false) => Leaning::Left,
            (false, true) => Leaning::Right,
            (true, true) => Leaning::Both,
        }
    }
}

//! Final post-pass: choose the smallest set of suspect blocks whose
//! removal validates the document, then narrow each survivor down the
//! block tree as far as the parser allows.

use tracing::debug;

use crate::block::{BlockDocument, NodeId};
use crate::frontier::CodeFrontier;
use crate::parse::{validator, ParserError};

/// Subset sizes beyond this are not searched; the full invalid set is
/// returned as the best-effort answer instead.
pub const MAX_SUBSET_SIZE: usize = 6;

pub struct InvalidBlockSelector<'doc> {
    document: &'doc mut BlockDocument,
    max_subset_size: usize,
}

impl<'doc> InvalidBlockSelector<'doc> {
    pub fn new(document: &'doc mut BlockDocument) -> Self {
        Self {
            document,
            max_subset_size: MAX_SUBSET_SIZE,
        }
    }

    pub fn with_max_subset_size(mut self, max_subset_size: usize) -> Self {
        self.max_subset_size = max_subset_size.max(1);
        self
    }

    /// The smallest subset of the frontier's invalid blocks whose
    /// removal validates the document, refined down the tree. Empty
    /// when the frontier holds no invalid blocks.
    pub fn select(mut self, frontier: &CodeFrontier) -> Result<Vec<(u32, u32)>, ParserError> {
        let invalid: Vec<NodeId> = frontier
            .invalid_blocks()
            .iter()
            .map(|block| block.node())
            .collect();
        if invalid.is_empty() {
            return Ok(Vec::new());
        }

        let chosen = self.smallest_validating_subset(&invalid)?;
        let refined = self.refine(chosen)?;

        let mut ranges: Vec<(u32, u32)> = refined
            .iter()
            .map(|&id| self.document.node(id).range_tuple())
            .collect();
        ranges.sort_unstable();
        ranges.dedup();
        Ok(ranges)
    }

    /// Enumerate subsets in non-decreasing size; the first whose
    /// removal validates wins. Past the size cap, fall back to the
    /// full invalid set.
    fn smallest_validating_subset(
        &mut self,
        invalid: &[NodeId],
    ) -> Result<Vec<NodeId>, ParserError> {
        let cap = self.max_subset_size.min(invalid.len());
        for size in 1..=cap {
            let mut found = None;
            for_each_combination(invalid.len(), size, &mut |indices| {
                if found.is_some() {
                    return Ok(());
                }
                let subset: Vec<NodeId> = indices.iter().map(|&i| invalid[i]).collect();
                if self.removal_validates(&subset)? {
                    found = Some(subset);
                }
                Ok(())
            })?;
            if let Some(subset) = found {
                debug!(size, "validating subset found");
                return Ok(subset);
            }
        }
        debug!(count = invalid.len(), "no validating subset; returning full set");
        Ok(invalid.to_vec())
    }

    /// Replace composites with the subset of their invalid parents
    /// whenever the document still validates without them; repeat to a
    /// fixpoint. Each replacement strictly descends the tree, so this
    /// terminates.
    fn refine(&mut self, mut selected: Vec<NodeId>) -> Result<Vec<NodeId>, ParserError> {
        loop {
            let mut replaced = false;
            for at in 0..selected.len() {
                let id = selected[at];
                let parents = self.document.node(id).parents().to_vec();
                if parents.is_empty() {
                    continue;
                }
                let mut invalid_parents = Vec::new();
                for parent in parents {
                    if !self.document.node_valid(parent)? {
                        invalid_parents.push(parent);
                    }
                }
                if invalid_parents.is_empty() {
                    continue;
                }
                let mut candidate = selected.clone();
                candidate.remove(at);
                candidate.extend(invalid_parents);
                if self.removal_validates(&candidate)? {
                    selected = candidate;
                    replaced = true;
                    break;
                }
            }
            if !replaced {
                return Ok(selected);
            }
        }
    }

    fn removal_validates(&mut self, blocks: &[NodeId]) -> Result<bool, ParserError> {
        let ranges: Vec<(u32, u32)> = blocks
            .iter()
            .map(|&id| self.document.node(id).range_tuple())
            .collect();
        validator::valid_without(&ranges, self.document.lines())
    }
}

/// Visit every `size`-combination of `0..n` in lexicographic order.
fn for_each_combination<E>(
    n: usize,
    size: usize,
    visit: &mut impl FnMut(&[usize]) -> Result<(), E>,
) -> Result<(), E> {
    debug_assert!(size >= 1 && size <= n);
    let mut indices: Vec<usize> = (0..size).collect();
    loop {
        visit(&indices)?;
        // Rightmost index that can still advance.
        let Some(at) = (0..size).rev().find(|&i| indices[i] != i + n - size) else {
            return Ok(());
        };
        indices[at] += 1;
        for next in at + 1..size {
            indices[next] = indices[next - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_cover_all_subsets_in_order() {
        let mut seen: Vec<Vec<usize>> = Vec::new();
        for_each_combination::<()>(4, 2, &mut |indices| {
            seen.push(indices.to_vec());
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn single_element_combinations() {
        let mut seen = Vec::new();
        for_each_combination::<()>(3, 1, &mut |indices| {
            seen.push(indices[0]);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn full_width_combination_is_visited_once() {
        let mut count = 0;
        for_each_combination::<()>(3, 3, &mut |_| {
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 1);
    }
}

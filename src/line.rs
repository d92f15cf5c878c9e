use std::cell::Cell;
use std::rc::Rc;

use crate::clean::{clean_source, CleanedLine};
use crate::lex::{tokenize, LexError, LexPairDiff};

/// One logical input line, immutable once built apart from its
/// visibility flag.
#[derive(Debug, Clone)]
pub struct CodeLine {
    index: u32,
    original: String,
    sanitized: String,
    visible: Cell<bool>,
    empty: bool,
    indent: u32,
    lex_diff: LexPairDiff,
}

impl CodeLine {
    fn from_cleaned(index: u32, cleaned: CleanedLine) -> Result<Self, LexError> {
        let empty = cleaned.hidden || cleaned.sanitized.trim().is_empty();
        let indent = if empty {
            0
        } else {
            leading_columns(&cleaned.original)
        };
        let mut lex_diff = LexPairDiff::new_empty();
        for token in tokenize(&cleaned.sanitized) {
            if !lex_diff.record(token) {
                return Err(LexError::Overflow {
                    line: index as usize + 1,
                });
            }
        }
        Ok(Self {
            index,
            original: cleaned.original,
            sanitized: cleaned.sanitized,
            visible: Cell::new(true),
            empty,
            indent,
            lex_diff,
        })
    }

    /// Zero-based line index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Raw line text including its trailing newline.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Cleaned text, what the lexer and reference parser consume.
    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    pub fn visible(&self) -> bool {
        self.visible.get()
    }

    pub fn mark_invisible(&self) {
        self.visible.set(false);
    }

    /// Visibly blank: whitespace-only after cleaning, or hidden.
    pub fn empty(&self) -> bool {
        self.empty
    }

    pub fn indent(&self) -> u32 {
        self.indent
    }

    pub fn lex_diff(&self) -> &LexPairDiff {
        &self.lex_diff
    }
}

/// Clean the source and build one [`CodeLine`] per physical line.
pub fn build_lines(source: &str) -> Result<Vec<CodeLine>, LexError> {
    clean_source(source)
        .into_iter()
        .enumerate()
        .map(|(index, cleaned)| CodeLine::from_cleaned(index as u32, cleaned))
        .collect()
}

fn leading_columns(raw: &str) -> u32 {
    raw.chars().take_while(|c| *c == ' ' || *c == '\t').count() as u32
}

/// Cheaply cloneable handle to the document's lines, shared by the
/// block document, the frontier, and the validity checks.
#[derive(Clone)]
pub struct CodeLines {
    inner: Rc<Vec<CodeLine>>,
}

impl CodeLines {
    pub fn new(lines: Vec<CodeLine>) -> Self {
        Self {
            inner: Rc::new(lines),
        }
    }

    pub fn from_source(source: &str) -> Result<Self, LexError> {
        Ok(Self::new(build_lines(source)?))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, index: u32) -> &CodeLine {
        &self.inner[index as usize]
    }

    /// Sanitized text of an inclusive line range, as the reference
    /// parser should see it.
    pub fn block_text(&self, start_index: u32, end_index: u32) -> String {
        self.inner[start_index as usize..=end_index as usize]
            .iter()
            .map(|line| line.sanitized())
            .collect()
    }

    /// Sanitized text of every line still visible and not covered by
    /// one of the excluded inclusive ranges.
    pub fn visible_text_without(&self, excluded: &[(u32, u32)]) -> String {
        self.inner
            .iter()
            .filter(|line| line.visible())
            .filter(|line| {
                !excluded
                    .iter()
                    .any(|&(start, end)| start <= line.index() && line.index() <= end)
            })
            .map(|line| line.sanitized())
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Leaning;

    #[test]
    fn builds_one_line_per_physical_line() {
        let lines = build_lines("def foo\n  1\nend\n").unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].index(), 0);
        assert_eq!(lines[2].original(), "end\n");
    }

    #[test]
    fn indent_counts_leading_columns() {
        let lines = build_lines("def foo\n    x = 1\nend\n").unwrap();
        assert_eq!(lines[0].indent(), 0);
        assert_eq!(lines[1].indent(), 4);
    }

    #[test]
    fn blank_lines_are_empty_with_zero_indent() {
        let lines = build_lines("def foo\n\n   \nend\n").unwrap();
        assert!(lines[1].empty());
        assert!(lines[2].empty());
        assert_eq!(lines[2].indent(), 0);
    }

    #[test]
    fn comment_only_lines_count_as_empty() {
        let lines = build_lines("  # note\nx = 1\n").unwrap();
        assert!(lines[0].empty());
        assert!(!lines[1].empty());
    }

    #[test]
    fn per_line_diffs_capture_leaning() {
        let lines = build_lines("def foo\n  x = 1\nend\n").unwrap();
        assert_eq!(lines[0].lex_diff().leaning(), Leaning::Left);
        assert_eq!(lines[1].lex_diff().leaning(), Leaning::Equal);
        assert_eq!(lines[2].lex_diff().leaning(), Leaning::Right);
    }

    #[test]
    fn lines_start_visible() {
        let lines = build_lines("x = 1\n").unwrap();
        assert!(lines[0].visible());
        lines[0].mark_invisible();
        assert!(!lines[0].visible());
    }
}

//! Reference-parser validity checks.
//!
//! `valid` answers "does this text parse as a complete program?".
//! Verdicts are memoized in a thread-local cache keyed by the xxh3
//! hash of the text, since the search probes the same block texts
//! repeatedly. The cache is capped; at capacity it is cleared and
//! rebuilt on demand.

use std::cell::RefCell;
use std::collections::HashMap;

use xxhash_rust::xxh3::xxh3_64;

use crate::line::CodeLines;
use crate::parse::errors::ParserError;
use crate::pool;

const MAX_CACHE_ENTRIES: usize = 1024;

thread_local! {
    static VERDICT_CACHE: RefCell<HashMap<u64, bool>> =
        RefCell::new(HashMap::with_capacity(256));
}

/// True iff the reference parser accepts the text as a complete
/// program. Whitespace-only text is trivially valid.
pub fn valid(source: &str) -> Result<bool, ParserError> {
    if source.trim().is_empty() {
        return Ok(true);
    }
    let key = xxh3_64(source.as_bytes());
    if let Some(verdict) = VERDICT_CACHE.with(|cache| cache.borrow().get(&key).copied()) {
        return Ok(verdict);
    }
    let verdict = pool::with_parser(|parser| {
        parser
            .parse_with_source(source)
            .map(|parsed| !parsed.has_errors())
    })??;
    VERDICT_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(key, verdict);
    });
    Ok(verdict)
}

/// Reconstruct the document without the given inclusive line ranges
/// (hidden lines are dropped as well) and check it parses.
pub fn valid_without(without: &[(u32, u32)], lines: &CodeLines) -> Result<bool, ParserError> {
    valid(&lines.visible_text_without(without))
}

/// Clear the verdict cache (test support).
#[cfg(test)]
pub fn clear_cache() {
    VERDICT_CACHE.with(|cache| cache.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_accepts_complete_programs() {
        assert!(valid("def foo\n  1\nend\n").unwrap());
        assert!(valid("").unwrap());
        assert!(valid("\n\n").unwrap());
    }

    #[test]
    fn valid_rejects_unclosed_blocks() {
        assert!(!valid("def foo\n  1\n").unwrap());
        assert!(!valid("end\n").unwrap());
    }

    #[test]
    fn repeated_probes_hit_the_cache() {
        clear_cache();
        let source = "class Bar\nend\n";
        assert!(valid(source).unwrap());
        // Same text, same verdict, no re-parse needed for correctness.
        assert!(valid(source).unwrap());
    }

    #[test]
    fn valid_without_drops_the_given_ranges() {
        let lines = CodeLines::from_source("def foo\nclass Bar\nend\nend\n").unwrap();
        assert!(valid_without(&[(0, 0), (3, 3)], &lines).unwrap());
        assert!(!valid_without(&[(1, 1)], &lines).unwrap());
    }

    #[test]
    fn valid_without_everything_is_trivially_valid() {
        let lines = CodeLines::from_source("end\n").unwrap();
        assert!(valid_without(&[(0, 0)], &lines).unwrap());
    }
}

//! Pattern matching utilities for prompt detection.

use regex::bytes::Regex;

/// An ordered set of compiled prompt patterns.
///
/// Pattern order matters: when several patterns match the buffered output,
/// the match that starts earliest in the stream wins, and ties are broken by
/// list position. This mirrors how a human watching the terminal would react
/// to whichever prompt appeared first.
#[derive(Debug, Clone)]
pub struct PromptSet {
    patterns: Vec<Regex>,
}

/// A single match within the buffered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptMatch {
    /// Index of the matching pattern within the set.
    pub index: usize,

    /// Byte offset where the match starts.
    pub start: usize,

    /// Byte offset where the match ends.
    pub end: usize,
}

impl PromptSet {
    /// Compile a list of pattern strings into a set.
    pub fn compile(patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// An empty set. `expect` against it degenerates into a pure
    /// wait-for-end-of-stream, used to drain trailing output.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Find the match that occurs earliest in `data`.
    ///
    /// Ties on the start offset resolve in favor of the lower pattern index.
    pub fn find_earliest(&self, data: &[u8]) -> Option<PromptMatch> {
        let mut best: Option<PromptMatch> = None;
        for (index, pattern) in self.patterns.iter().enumerate() {
            if let Some(m) = pattern.find(data) {
                let candidate = PromptMatch {
                    index,
                    start: m.start(),
                    end: m.end(),
                };
                match best {
                    Some(b) if b.start <= candidate.start => {}
                    _ => best = Some(candidate),
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_single_pattern() {
        let set = PromptSet::compile(&["created or renamed"]).unwrap();
        let m = set.find_earliest(b"table created or renamed").unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(&b"table created or renamed"[m.start..m.end], b"created or renamed");
    }

    #[test]
    fn test_earliest_match_wins() {
        let set = PromptSet::compile(&["beta", "alpha"]).unwrap();

        // "alpha" appears first in the stream, so pattern 1 wins even
        // though pattern 0 also matches.
        let m = set.find_earliest(b"alpha then beta").unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.start, 0);
    }

    #[test]
    fn test_tie_breaks_by_list_order() {
        let set = PromptSet::compile(&["abc", "abcdef"]).unwrap();
        let m = set.find_earliest(b"abcdef").unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_no_match() {
        let set = PromptSet::compile(&["created or renamed"]).unwrap();
        assert!(set.find_earliest(b"compiling migration tool...").is_none());
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = PromptSet::empty();
        assert!(set.is_empty());
        assert!(set.find_earliest(b"anything at all").is_none());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(PromptSet::compile(&["created (or"]).is_err());
    }
}

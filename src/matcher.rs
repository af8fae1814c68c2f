use std::collections::HashSet;

use regex::Regex;

use crate::error::Error;
use crate::types::Result;

/// Compile `pattern` so that it only matches an entire column name
pub fn compile_full(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| Error::Config(format!("invalid pattern '{pattern}': {e}")))
}

/// A set of column-name patterns evaluated with full-match semantics.
///
/// `id` matches the column `id` but not `patient_id`; write `.*id` for that.
#[derive(Debug, Clone, Default)]
pub struct ColumnMatcher {
    compiled: Vec<Regex>,
}

impl ColumnMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| compile_full(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { compiled })
    }

    /// True iff any pattern matches the whole of `name`
    pub fn matches(&self, name: &str) -> bool {
        match_any(&self.compiled, name)
    }

    /// Indices of the matching `names`, pattern by pattern in recipe order.
    /// Each index appears once, at its first match.
    pub fn matching_indices<'a, I>(&self, names: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = names.into_iter().collect();
        let mut seen = HashSet::new();
        let mut indices = Vec::new();
        for re in &self.compiled {
            for (idx, name) in names.iter().enumerate() {
                if re.is_match(name) && seen.insert(idx) {
                    indices.push(idx);
                }
            }
        }
        indices
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// True iff any of `patterns` (built with [`compile_full`]) matches `name`
pub fn match_any(patterns: &[Regex], name: &str) -> bool {
    patterns.iter().any(|re| re.is_match(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| compile_full(p).unwrap()).collect()
    }

    #[test]
    fn test_full_match_only() {
        assert!(match_any(&full(&["id"]), "id"));
        assert!(!match_any(&full(&["id"]), "patient_id"));
        assert!(!match_any(&full(&["id"]), "id_2"));
        assert!(match_any(&full(&[".*id"]), "patient_id"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        // Without grouping, `^a|b$` would match "abc" through the first branch
        assert!(!match_any(&full(&["a|b"]), "abc"));
        assert!(match_any(&full(&["a|b"]), "b"));
    }

    #[test]
    fn test_no_patterns_match_nothing() {
        assert!(!match_any(&[], "id"));
    }

    #[test]
    fn test_any_of_several() {
        let matcher = ColumnMatcher::new(&["lat", "lon(gitude)?"]).unwrap();
        assert!(matcher.matches("longitude"));
        assert!(matcher.matches("lat"));
        assert!(!matcher.matches("latitude"));
    }

    #[test]
    fn test_matching_indices_pattern_major_and_deduplicated() {
        let matcher = ColumnMatcher::new(&["b.*", ".*a.*"]).unwrap();
        let names = ["alpha", "beta", "gamma", "delta"];
        assert_eq!(matcher.matching_indices(names), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_empty_matcher_matches_nothing() {
        let matcher = ColumnMatcher::new::<&str>(&[]).unwrap();
        assert!(matcher.is_empty());
        assert!(!matcher.matches("anything"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = ColumnMatcher::new(&["("]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

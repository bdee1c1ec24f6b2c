//! Fuzzy text matching for pickers.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Returns `true` if `pattern` fuzzy-matches `text`, ignoring case.
    ///
    /// An empty pattern matches everything.
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        pattern.is_empty() || self.inner.fuzzy_match(text, pattern).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_match() {
        let matcher = Matcher::new();

        assert!(matcher.matches("formsflow-designer", "designer"));
        assert!(matcher.matches("formsflow-reviewer", "ffrev"));
        assert!(matcher.matches("ADMIN", "adm"));
        assert!(matcher.matches("admin", "ADM"));
        assert!(!matcher.matches("admin", "xyz"));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let matcher = Matcher::new();
        assert!(matcher.matches("anything", ""));
        assert!(matcher.matches("", ""));
    }
}

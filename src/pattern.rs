/*!
 * Shell-style glob matching for ignore patterns
 */

use glob::{MatchOptions, Pattern};

/// `*` crosses path separators and leading dots are not special.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A pattern compiled once at load time
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    glob: Option<Pattern>,
}

impl CompiledPattern {
    /// Compile a pattern. Invalid globs fall back to literal comparison.
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            glob: Pattern::new(raw).ok(),
        }
    }

    /// The pattern text as it was supplied
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whole-string, case-sensitive match
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.glob {
            Some(glob) => glob.matches_with(candidate, MATCH_OPTIONS),
            None => candidate == self.raw,
        }
    }
}

/// Match a candidate string against a glob pattern.
pub fn matches(candidate: &str, pattern: &str) -> bool {
    CompiledPattern::new(pattern).matches(candidate)
}

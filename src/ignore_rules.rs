/*!
 * Ignore rule aggregation
 *
 * Patterns come from an optional rule file, from the command line and from a
 * small built-in list, in that order. The output file name is always appended
 * last so a run never embeds its own previous output.
 */

use std::fs;
use std::io;
use std::path::{Component, Path};

use log::debug;

use crate::pattern::CompiledPattern;

/// Patterns applied to every walk
pub const DEFAULT_IGNORE: &[&str] = &[".git", "__pycache__", ".DS_Store", "*.pyc", "*.pyo"];

/// Ordered, de-duplicated set of ignore patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<CompiledPattern>,
}

impl IgnoreRules {
    /// Build the rule set for one run.
    ///
    /// A missing or unreadable rule file contributes nothing; the failure is
    /// logged rather than returned.
    pub fn load(rule_file: Option<&Path>, explicit: &[String], output_name: &str) -> Self {
        let mut rules = Self::default();

        if let Some(path) = rule_file {
            match read_rule_file(path) {
                Ok(patterns) => {
                    debug!(
                        "Loaded {} patterns from {}",
                        patterns.len(),
                        path.display()
                    );
                    for pattern in &patterns {
                        rules.push(pattern);
                    }
                }
                Err(e) => debug!("Failed to read ignore file {}: {}", path.display(), e),
            }
        }

        for pattern in explicit {
            rules.push(pattern);
        }

        for pattern in DEFAULT_IGNORE {
            rules.push(pattern);
        }

        let output_name = Path::new(output_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| output_name.to_string());
        if !output_name.is_empty() {
            rules.push(&output_name);
        }

        rules
    }

    /// Append a pattern unless the exact string is already present
    pub fn push(&mut self, pattern: &str) {
        if !self.patterns.iter().any(|p| p.as_str() == pattern) {
            self.patterns.push(CompiledPattern::new(pattern));
        }
    }

    /// Patterns in precedence order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(CompiledPattern::as_str)
    }

    /// Number of patterns in the set
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set holds no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Decide whether an entry is excluded.
    ///
    /// A pattern excludes the entry if it matches the path relative to the
    /// walk root or any single component of it. Only absolute patterns are
    /// tested against the absolute path, so names above the root never count.
    pub fn is_ignored(&self, absolute: &Path, relative: &Path) -> bool {
        let absolute = absolute.to_string_lossy();
        let relative_str = relative.to_string_lossy();
        let segments: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect();

        self.patterns.iter().any(|pattern| {
            (Path::new(pattern.as_str()).is_absolute() && pattern.matches(&absolute))
                || pattern.matches(&relative_str)
                || segments.iter().any(|segment| pattern.matches(segment))
        })
    }
}

/// Read patterns from a line-based rule file.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
pub fn read_rule_file(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

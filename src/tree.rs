/*!
 * ASCII directory tree rendering
 */

use std::path::Path;

use crate::ignore_rules::IgnoreRules;
use crate::scanner::list_directory;
use crate::types::EntryKind;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const CONTINUATION: &str = "│   ";
const PADDING: &str = "    ";

/// Renders the filtered directory structure as tree lines
pub struct TreeRenderer<'a> {
    rules: &'a IgnoreRules,
}

impl<'a> TreeRenderer<'a> {
    /// Create a renderer that hides entries matched by `rules`
    pub fn new(rules: &'a IgnoreRules) -> Self {
        Self { rules }
    }

    /// Render every entry below `root`, one display line per entry
    pub fn render(&self, root: &Path) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_directory(root, Path::new(""), "", &mut lines);
        lines
    }

    fn render_directory(&self, abs_path: &Path, rel_path: &Path, prefix: &str, lines: &mut Vec<String>) {
        let listing = match list_directory(abs_path, rel_path, self.rules) {
            Ok(listing) => listing,
            Err(e) => {
                lines.push(format!("{}{}(cannot access: {})", prefix, CORNER, e));
                return;
            }
        };

        let count = listing.entries.len();
        for (i, entry) in listing.entries.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { CORNER } else { BRANCH };

            match entry.kind {
                EntryKind::Directory => {
                    lines.push(format!("{}{}{}/", prefix, connector, entry.name));
                    let child_prefix = format!("{}{}", prefix, if is_last { PADDING } else { CONTINUATION });
                    self.render_directory(&entry.path, &entry.rel_path, &child_prefix, lines);
                }
                EntryKind::LinkedDirectory => {
                    lines.push(format!("{}{}{}/", prefix, connector, entry.name));
                }
                EntryKind::File => {
                    lines.push(format!("{}{}{}", prefix, connector, entry.name));
                }
            }
        }
    }
}

/*!
 * Directory scanning
 *
 * The walk is depth-first pre-order over non-ignored directories. It is driven
 * by an explicit stack of pending directories, so deep trees never grow the
 * call stack, and it is lazy: each call to `next` lists exactly one directory.
 */

use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::ignore_rules::IgnoreRules;
use crate::types::{DirectoryVisit, Entry, EntryKind};

/// Non-ignored entries of one directory plus the number pruned
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Surviving entries sorted by name
    pub entries: Vec<Entry>,
    /// Entries removed by ignore rules
    pub ignored: usize,
}

/// List a directory, filter it and sort by name.
///
/// `rel_path` is the directory's path relative to the walk root.
pub fn list_directory(
    abs_path: &Path,
    rel_path: &Path,
    rules: &IgnoreRules,
) -> Result<Listing, walkdir::Error> {
    let raw = WalkDir::new(abs_path)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut listing = Listing::default();
    for entry in raw {
        let name = entry.file_name().to_string_lossy().to_string();
        let entry_rel = rel_path.join(&name);

        if rules.is_ignored(entry.path(), &entry_rel) {
            debug!("Ignoring {}", entry_rel.display());
            listing.ignored += 1;
            continue;
        }

        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else if entry.path_is_symlink() && entry.path().is_dir() {
            EntryKind::LinkedDirectory
        } else {
            EntryKind::File
        };

        listing.entries.push(Entry {
            name,
            path: entry.into_path(),
            rel_path: entry_rel,
            kind,
        });
    }

    Ok(listing)
}

/// Scanner for directory contents
pub struct Scanner<'a> {
    root: PathBuf,
    rules: &'a IgnoreRules,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner rooted at `root`
    pub fn new(root: impl Into<PathBuf>, rules: &'a IgnoreRules) -> Self {
        Self {
            root: root.into(),
            rules,
        }
    }

    /// Start a fresh walk from the root
    pub fn walk(&self) -> Walk<'a> {
        Walk {
            rules: self.rules,
            pending: vec![Frame {
                path: self.root.clone(),
                rel_path: PathBuf::new(),
                name: String::new(),
                depth: 0,
            }],
            path_stack: Vec::new(),
        }
    }
}

/// Directory waiting to be visited
#[derive(Debug)]
struct Frame {
    path: PathBuf,
    rel_path: PathBuf,
    name: String,
    depth: usize,
}

/// Lazy pre-order sequence of directory visits
pub struct Walk<'a> {
    rules: &'a IgnoreRules,
    pending: Vec<Frame>,
    path_stack: Vec<String>,
}

impl Iterator for Walk<'_> {
    type Item = DirectoryVisit;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.pending.pop()?;

        // Drop ancestors the walk has returned above
        if frame.depth > 0 {
            self.path_stack.truncate(frame.depth - 1);
            self.path_stack.push(frame.name.clone());
        } else {
            self.path_stack.clear();
        }

        let mut visit = DirectoryVisit {
            path: frame.path,
            rel_path: frame.rel_path,
            depth: frame.depth,
            breadcrumb: self.path_stack.clone(),
            subdirs: Vec::new(),
            files: Vec::new(),
            ignored: 0,
            error: None,
        };

        match list_directory(&visit.path, &visit.rel_path, self.rules) {
            Ok(listing) => {
                visit.ignored = listing.ignored;
                for entry in listing.entries {
                    match entry.kind {
                        EntryKind::Directory => visit.subdirs.push(entry),
                        EntryKind::File => visit.files.push(entry),
                        EntryKind::LinkedDirectory => {
                            debug!("Not following linked directory {}", entry.rel_path.display())
                        }
                    }
                }
            }
            Err(e) => {
                debug!("Cannot list {}: {}", visit.path.display(), e);
                visit.error = Some(e.to_string());
            }
        }

        // Reverse so the first subdirectory is visited next
        for dir in visit.subdirs.iter().rev() {
            self.pending.push(Frame {
                path: dir.path.clone(),
                rel_path: dir.rel_path.clone(),
                name: dir.name.clone(),
                depth: frame.depth + 1,
            });
        }

        Some(visit)
    }
}

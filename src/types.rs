/*!
 * Core types and data structures for dir-to-md
 */

use std::path::PathBuf;

/// Kind of a filesystem entry as seen by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory that is descended into
    Directory,
    /// Symbolic link pointing at a directory; listed but never descended
    LinkedDirectory,
    /// Anything else (regular files, links to files, special files)
    File,
}

/// A single non-ignored entry of a directory listing
#[derive(Debug, Clone)]
pub struct Entry {
    /// Entry name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the walk root
    pub rel_path: PathBuf,
    /// Entry kind
    pub kind: EntryKind,
}

/// One directory produced by the walker
#[derive(Debug, Clone)]
pub struct DirectoryVisit {
    /// Absolute path of the directory
    pub path: PathBuf,
    /// Path relative to the walk root (empty for the root)
    pub rel_path: PathBuf,
    /// Number of components between the root and this directory
    pub depth: usize,
    /// Ancestor names down to and including this directory
    pub breadcrumb: Vec<String>,
    /// Non-ignored subdirectories, sorted by name
    pub subdirs: Vec<Entry>,
    /// Non-ignored files, sorted by name
    pub files: Vec<Entry>,
    /// Entries of this listing removed by ignore rules
    pub ignored: usize,
    /// Listing failure, if the directory could not be read
    pub error: Option<String>,
}

impl DirectoryVisit {
    /// Whether this visit is the walk root
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Outcome of serializing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Decoded text, embedded in a fenced block
    Text {
        text: String,
        /// Name of the encoding that decoded the bytes
        encoding: &'static str,
    },
    /// Markdown produced by the converter
    Converted {
        text: String,
        /// Name of the converter that produced the text
        converter: String,
    },
    /// The converter succeeded but returned nothing
    ConversionEmpty,
    /// The converter failed
    ConversionFailed(String),
    /// Binary or undecodable content
    Binary {
        /// The extension is convertible but no converter is available
        conversion_unavailable: bool,
    },
    /// The file could not be read
    Unreadable(String),
}

impl Content {
    /// Whether this outcome counts as a failed file
    pub fn is_failure(&self) -> bool {
        !matches!(self, Content::Text { .. } | Content::Converted { .. })
    }

    /// Short reason for failed outcomes, used in reports
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Content::Text { .. } | Content::Converted { .. } => None,
            Content::ConversionEmpty => Some("conversion returned empty content".to_string()),
            Content::ConversionFailed(e) => Some(format!("conversion failed: {}", e)),
            Content::Binary {
                conversion_unavailable: true,
            } => Some("binary file, conversion unavailable".to_string()),
            Content::Binary {
                conversion_unavailable: false,
            } => Some("binary file".to_string()),
            Content::Unreadable(e) => Some(format!("unreadable: {}", e)),
        }
    }
}

/// A file ready to be written into the document
#[derive(Debug, Clone)]
pub struct RenderedFile {
    /// File name
    pub name: String,
    /// Path relative to the walk root
    pub rel_path: PathBuf,
    /// Size in bytes, if metadata was available
    pub size: Option<u64>,
    /// Lowercased extension including the leading dot, or empty
    pub extension: String,
    /// Fence language tag, empty when unknown
    pub language: &'static str,
    /// Serialized payload
    pub content: Content,
}

impl RenderedFile {
    /// Whether the converter was invoked for this file
    pub fn was_delegated(&self) -> bool {
        matches!(
            self.content,
            Content::Converted { .. } | Content::ConversionEmpty | Content::ConversionFailed(_)
        )
    }
}

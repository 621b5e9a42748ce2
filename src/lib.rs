/*!
 * dir-to-md - Convert a directory tree into a single Markdown document
 *
 * This library walks a directory, skips entries matched by ignore rules, and
 * writes a Markdown file containing the directory tree followed by the
 * content of every visible file inside collision-free code fences.
 */

pub mod config;
pub mod converter;
pub mod error;
pub mod ignore_rules;
pub mod pattern;
pub mod report;
pub mod scanner;
pub mod serializer;
pub mod stats;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use config::Config;
pub use converter::{Converter, MarkItDown};
pub use error::{DirToMdError, Result};
pub use ignore_rules::IgnoreRules;
pub use report::{ReportFormat, Reporter, ScanReport};
pub use scanner::Scanner;
pub use serializer::ContentSerializer;
pub use stats::Stats;
pub use tree::TreeRenderer;
pub use types::{Content, DirectoryVisit, Entry, EntryKind, RenderedFile};
pub use utils::{count_files, format_file_size};
pub use writer::{generate, MarkdownWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

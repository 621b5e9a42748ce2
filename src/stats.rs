/*!
 * Run statistics
 */

use std::time::{Duration, Instant};

use crate::types::{Content, DirectoryVisit, RenderedFile};

/// Counters for one processing run
#[derive(Debug, Clone)]
pub struct Stats {
    /// Directories visited (including the root)
    pub total_dirs: usize,
    /// Files visited
    pub total_files: usize,
    /// Files embedded as text
    pub text_files: usize,
    /// Files converted by the external converter
    pub converted_files: usize,
    /// Entries removed by ignore rules
    pub ignored_paths: usize,
    /// Files that produced no content
    pub failed_files: usize,
    /// Directories that could not be listed
    pub unreadable_dirs: usize,
    /// Relative path and reason for every failure
    pub failures: Vec<(String, String)>,
    started: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    /// Start counting; the elapsed clock starts now
    pub fn new() -> Self {
        Self {
            total_dirs: 0,
            total_files: 0,
            text_files: 0,
            converted_files: 0,
            ignored_paths: 0,
            failed_files: 0,
            unreadable_dirs: 0,
            failures: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Tally a directory produced by the walker
    pub fn record_visit(&mut self, visit: &DirectoryVisit) {
        self.total_dirs += 1;
        self.ignored_paths += visit.ignored;
        if let Some(error) = &visit.error {
            self.unreadable_dirs += 1;
            self.failures.push((visit.rel_path.display().to_string(), error.clone()));
        }
    }

    /// Tally a serialized file
    pub fn record_file(&mut self, file: &RenderedFile) {
        self.total_files += 1;
        match &file.content {
            Content::Text { .. } => self.text_files += 1,
            Content::Converted { .. } => self.converted_files += 1,
            other => {
                self.failed_files += 1;
                if let Some(reason) = other.failure_reason() {
                    self.failures
                        .push((file.rel_path.display().to_string(), reason));
                }
            }
        }
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

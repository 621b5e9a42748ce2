/*!
 * Markdown writer implementation for dir-to-md
 *
 * Assembles the document in one pass: header, directory tree, one section per
 * directory and file in walk order, then the statistics list.
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;

use crate::config::Config;
use crate::error::{DirToMdError, Result};
use crate::ignore_rules::IgnoreRules;
use crate::scanner::Scanner;
use crate::serializer::{fenced_block, ContentSerializer};
use crate::stats::Stats;
use crate::tree::TreeRenderer;
use crate::types::{Content, DirectoryVisit, RenderedFile};
use crate::utils::{count_files, file_icon, file_type_description, format_file_size};

/// Deepest Markdown heading level
const MAX_HEADING: usize = 6;

/// Heading marker for a given level, saturating at `MAX_HEADING`
pub fn heading(level: usize) -> String {
    "#".repeat(level.clamp(1, MAX_HEADING))
}

/// Markdown writer for directory contents
pub struct MarkdownWriter<'a> {
    /// Writer configuration
    config: &'a Config,
    rules: &'a IgnoreRules,
    serializer: ContentSerializer,
    /// Progress bar
    progress: Arc<ProgressBar>,
}

impl<'a> MarkdownWriter<'a> {
    /// Create a new Markdown writer
    pub fn new(
        config: &'a Config,
        rules: &'a IgnoreRules,
        serializer: ContentSerializer,
        progress: Arc<ProgressBar>,
    ) -> Self {
        Self {
            config,
            rules,
            serializer,
            progress,
        }
    }

    /// Write the document to the configured output file.
    ///
    /// A file this call created is removed again when writing it fails. A
    /// file that could not be opened is left untouched.
    pub fn write(&self) -> Result<Stats> {
        let output = &self.config.output_file;
        let file = File::create(output).map_err(|e| {
            DirToMdError::Output(format!("cannot create {}: {}", output.display(), e))
        })?;
        let mut writer = BufWriter::new(file);

        let result = self.write_to(&mut writer).and_then(|stats| {
            writer
                .flush()
                .map_err(|e| DirToMdError::Output(format!("cannot flush output: {}", e)))?;
            Ok(stats)
        });

        if result.is_err() {
            drop(writer);
            if let Err(e) = fs::remove_file(output) {
                debug!("Failed to remove partial output {}: {}", output.display(), e);
            }
        }
        result
    }

    /// Write the document to any sink
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<Stats> {
        let mut stats = Stats::new();

        self.write_header(out)?;
        self.write_tree(out)?;

        let scanner = Scanner::new(&self.config.target_dir, self.rules);
        for visit in scanner.walk() {
            stats.record_visit(&visit);
            self.write_directory(out, &visit)?;

            for file in self.serialize_files(&visit) {
                stats.record_file(&file);
                self.write_file(out, &file, visit.depth)?;
            }
        }

        self.write_statistics(out, &stats)?;
        Ok(stats)
    }

    /// Serialize a directory's files in parallel, preserving listing order
    fn serialize_files(&self, visit: &DirectoryVisit) -> Vec<RenderedFile> {
        visit
            .files
            .par_iter()
            .map(|entry| {
                self.progress.set_message(format!("Current file: {}", entry.name));
                let rendered = self.serializer.serialize(&entry.path, &entry.rel_path);
                self.progress.inc(1);
                rendered
            })
            .collect()
    }

    fn write_header<W: Write>(&self, out: &mut W) -> Result<()> {
        let abs = self
            .config
            .target_dir
            .canonicalize()
            .unwrap_or_else(|_| self.config.target_dir.clone());
        let name = display_name(&abs);

        writeln!(out, "# 📁 Directory: {}\n", name)?;
        writeln!(out, "**Source path**: `{}`  ", abs.display())?;
        writeln!(
            out,
            "**Generated**: {}  \n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        Ok(())
    }

    fn write_tree<W: Write>(&self, out: &mut W) -> Result<()> {
        let lines = TreeRenderer::new(self.rules).render(&self.config.target_dir);

        writeln!(out, "## 📊 Directory Structure\n")?;
        writeln!(out, "```")?;
        writeln!(out, "{}", lines.join("\n"))?;
        writeln!(out, "```\n")?;
        writeln!(out, "---\n")?;
        Ok(())
    }

    fn write_directory<W: Write>(&self, out: &mut W, visit: &DirectoryVisit) -> Result<()> {
        if !visit.is_root() {
            info!("Processing {}", visit.rel_path.display());
            writeln!(
                out,
                "{} 📂 Directory: {}\n",
                heading(visit.depth + 1),
                visit.breadcrumb.join(" / ")
            )?;
        }

        if let Some(error) = &visit.error {
            writeln!(out, "*(Cannot access directory: {})*\n", error)?;
        }
        Ok(())
    }

    fn write_file<W: Write>(&self, out: &mut W, file: &RenderedFile, depth: usize) -> Result<()> {
        writeln!(
            out,
            "{} {} File: {}\n",
            heading(depth + 2),
            file_icon(&file.extension),
            file.name
        )?;
        writeln!(out, "**Path**: `{}`  ", file.rel_path.display())?;
        match file.size {
            Some(size) => writeln!(out, "**Size**: {}  ", format_file_size(size))?,
            None => writeln!(out, "**Size**: unknown  ")?,
        }
        writeln!(out, "**Type**: {}\n", file_type_description(&file.extension))?;

        match &file.content {
            Content::Text { text, .. } => {
                write!(out, "{}", fenced_block(text, file.language))?;
                writeln!(out)?;
            }
            Content::Converted { text, converter } => {
                writeln!(out, "*(Converted with {})*\n", converter)?;
                write!(out, "{}", fenced_block(text, "markdown"))?;
                writeln!(out)?;
            }
            Content::ConversionEmpty => {
                writeln!(out, "*(Conversion succeeded but returned empty content)*\n")?;
            }
            Content::ConversionFailed(e) => {
                writeln!(out, "*(Conversion failed: {})*\n", e)?;
            }
            Content::Binary {
                conversion_unavailable: true,
            } => {
                writeln!(out, "*(Binary file, conversion unavailable)*\n")?;
            }
            Content::Binary {
                conversion_unavailable: false,
            } => {
                writeln!(out, "*(Binary file, content cannot be displayed)*\n")?;
            }
            Content::Unreadable(e) => {
                writeln!(out, "*(Cannot read file: {})*\n", e)?;
            }
        }

        writeln!(out, "---\n")?;
        Ok(())
    }

    fn write_statistics<W: Write>(&self, out: &mut W, stats: &Stats) -> Result<()> {
        writeln!(out, "\n## 📈 Statistics\n")?;
        writeln!(out, "- **Directories**: {}", stats.total_dirs)?;
        writeln!(out, "- **Files**: {}", stats.total_files)?;
        writeln!(out, "- **Text files**: {}", stats.text_files)?;
        writeln!(out, "- **Converted files**: {}", stats.converted_files)?;
        writeln!(out, "- **Failed files**: {}", stats.failed_files)?;
        writeln!(out, "- **Ignored paths**: {}", stats.ignored_paths)?;
        if stats.unreadable_dirs > 0 {
            writeln!(out, "- **Unreadable directories**: {}", stats.unreadable_dirs)?;
        }
        Ok(())
    }
}

/// Last path component, or the whole path for roots
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Generate the document described by `config`.
///
/// Validates the configuration, builds the ignore rules once and sizes the
/// progress bar from the visible file count before writing.
pub fn generate(
    config: &Config,
    serializer: ContentSerializer,
    progress: Arc<ProgressBar>,
) -> Result<Stats> {
    config.validate()?;

    let rules = IgnoreRules::load(
        config.ignore_file.as_deref(),
        &config.ignore_patterns,
        &config.output_name(),
    );
    debug!(
        "Ignore patterns: {}",
        rules.patterns().collect::<Vec<_>>().join(", ")
    );
    progress.set_length(count_files(&config.target_dir, &rules));

    MarkdownWriter::new(config, &rules, serializer, progress).write()
}

/*!
 * External document conversion
 *
 * Binary formats (PDF, office documents, images) are handed to an external
 * converter that produces Markdown. The core only sees the `Converter` trait;
 * running without a converter is a normal configuration.
 */

use std::env;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;
use thiserror::Error;

/// Error type for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The converter executable could not be started
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// The converter ran and reported failure
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The converter produced bytes that are not UTF-8
    #[error("Converter output is not valid UTF-8")]
    InvalidOutput,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Trait for converting a file to Markdown text
pub trait Converter: Send + Sync {
    /// Convert the file at `path`, returning Markdown
    fn convert(&self, path: &Path) -> Result<String>;

    /// Human readable converter name
    fn name(&self) -> &str;
}

/// Converter backed by the `markitdown` command-line tool
#[derive(Debug, Clone)]
pub struct MarkItDown {
    command: String,
}

impl MarkItDown {
    /// Use `command` as the converter executable
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Locate the converter, returning `None` when it is not installed
    pub fn detect(command: &str) -> Option<Self> {
        if command_exists(command) {
            debug!("Using {} for document conversion", command);
            Some(Self::new(command))
        } else {
            debug!("{} not found; documents and images will not be converted", command);
            None
        }
    }
}

impl Converter for MarkItDown {
    fn convert(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.command)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ConvertError::CommandNotFound(self.command.clone()),
                _ => ConvertError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().last().unwrap_or_default().trim().to_string();
            return Err(ConvertError::CommandFailed(if detail.is_empty() {
                format!("{} exited with status: {}", self.command, output.status)
            } else {
                format!("{} exited with status: {}: {}", self.command, output.status, detail)
            }));
        }

        String::from_utf8(output.stdout).map_err(|_| ConvertError::InvalidOutput)
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Check if a command exists on the system
///
/// Paths containing a separator are checked directly; bare names are looked
/// up on `PATH`.
pub fn command_exists(command: &str) -> bool {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }

    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}

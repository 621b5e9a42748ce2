/*!
 * Configuration handling for dir-to-md
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use log::warn;

use crate::error::Result;
use crate::{bail, ensure};

/// Suffix appended to the directory name for the default output file
pub const OUTPUT_SUFFIX: &str = "_combined.md";

/// Default converter executable
pub const DEFAULT_CONVERTER: &str = "markitdown";

/// Command-line arguments for dir-to-md
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "dir-to-md",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert a directory's structure and contents into one Markdown file",
    after_help = "Examples:\n  \
        dir-to-md ./skills/pdf/                    # basic usage\n  \
        dir-to-md ./skills/pdf/ -o output.md       # choose the output file\n  \
        dir-to-md ./project/ --ignore \"*.log\"      # skip log files\n  \
        dir-to-md ./docs/ --ignore-file .gitignore # read patterns from a file\n  \
        dir-to-md ./data/ --no-markitdown          # never convert documents"
)]
pub struct Args {
    /// Directory to process
    #[clap(required_unless_present = "generate")]
    pub directory: Option<String>,

    /// Output Markdown file (default: <directory name>_combined.md)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Ignore pattern (glob syntax); may be repeated
    #[clap(long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// File with one ignore pattern per line (e.g. .gitignore)
    #[clap(long, value_name = "PATH")]
    pub ignore_file: Option<String>,

    /// Do not convert documents and images with markitdown
    #[clap(long)]
    pub no_markitdown: bool,

    /// Converter executable used for documents and images
    #[clap(long, value_name = "CMD", default_value = DEFAULT_CONVERTER)]
    pub markitdown_command: String,

    /// Number of threads used to read and convert files
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Show detailed output
    #[clap(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process
    pub target_dir: PathBuf,

    /// Output Markdown file path
    pub output_file: PathBuf,

    /// Patterns to ignore, in command-line order
    pub ignore_patterns: Vec<String>,

    /// Line-based ignore rule file
    pub ignore_file: Option<PathBuf>,

    /// Whether documents and images are sent to the converter
    pub use_converter: bool,

    /// Converter executable
    pub converter_command: String,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Verbose diagnostics
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            output_file: PathBuf::from(default_output_name(".")),
            ignore_patterns: Vec::new(),
            ignore_file: None,
            use_converter: true,
            converter_command: DEFAULT_CONVERTER.to_string(),
            num_threads: 4,
            verbose: false,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let directory = args.directory.unwrap_or_default();
        let output_file = args
            .output
            .unwrap_or_else(|| default_output_name(&directory));

        Self {
            target_dir: PathBuf::from(directory),
            output_file: PathBuf::from(output_file),
            ignore_patterns: args.ignore_patterns,
            ignore_file: args.ignore_file.map(PathBuf::from),
            use_converter: !args.no_markitdown,
            converter_command: args.markitdown_command,
            num_threads: args.threads.max(1),
            verbose: args.verbose,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.target_dir.is_dir() {
            bail!(
                PathNotFound,
                "directory '{}' does not exist",
                self.target_dir.display()
            );
        }

        // Check if output file directory exists
        if let Some(parent) = self.output_file.parent() {
            ensure!(
                parent.as_os_str().is_empty() || parent.is_dir(),
                Config,
                "output directory not found: {}",
                parent.display()
            );
        }

        // A missing rule file only loses its patterns
        if let Some(path) = &self.ignore_file {
            if !path.is_file() {
                warn!("Ignore file not found: {}", path.display());
            }
        }

        Ok(())
    }

    /// Name the ignore rules use to keep the output out of the document
    pub fn output_name(&self) -> String {
        self.output_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.output_file.display().to_string())
    }
}

/// Derive the default output file name from the target directory.
///
/// Uses the last path segment; `.`-style and root paths resolve through the
/// filesystem first.
pub fn default_output_name(directory: &str) -> String {
    let trimmed = directory.trim_end_matches(['/', '\\']);
    let last = Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| n != "." && n != "..");

    let name = last
        .or_else(|| {
            fs::canonicalize(if trimmed.is_empty() { directory } else { trimmed })
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        })
        .unwrap_or_else(|| "directory".to_string());

    format!("{}{}", name.replace(['/', '\\'], "_"), OUTPUT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirToMdError;

    #[test]
    fn test_default_output_name() {
        assert_eq!(default_output_name("./skills/pdf/"), "pdf_combined.md");
        assert_eq!(default_output_name("project"), "project_combined.md");
        assert_eq!(default_output_name("a/b\\"), "b_combined.md");

        let cwd = std::env::current_dir().unwrap();
        let expected = format!(
            "{}{}",
            cwd.file_name().unwrap().to_string_lossy(),
            OUTPUT_SUFFIX
        );
        assert_eq!(default_output_name("."), expected);
    }

    #[test]
    fn test_from_args() {
        let args = Args::parse_from([
            "dir-to-md",
            "./proj/",
            "--ignore",
            "*.log",
            "--ignore",
            "dist",
            "--no-markitdown",
            "-v",
        ]);
        let config = Config::from_args(args);

        assert_eq!(config.target_dir, PathBuf::from("./proj/"));
        assert_eq!(config.output_file, PathBuf::from("proj_combined.md"));
        assert_eq!(config.ignore_patterns, vec!["*.log", "dist"]);
        assert!(!config.use_converter);
        assert!(config.verbose);
        assert_eq!(config.converter_command, DEFAULT_CONVERTER);
        assert_eq!(config.num_threads, 4);
    }

    #[test]
    fn test_explicit_output() {
        let args = Args::parse_from(["dir-to-md", "src", "-o", "out/ctx.md"]);
        let config = Config::from_args(args);
        assert_eq!(config.output_file, PathBuf::from("out/ctx.md"));
        assert_eq!(config.output_name(), "ctx.md");
    }

    #[test]
    fn test_directory_required() {
        assert!(Args::try_parse_from(["dir-to-md"]).is_err());
        assert!(Args::try_parse_from(["dir-to-md", "--generate", "bash"]).is_ok());
    }

    #[test]
    fn test_validate_missing_directory() {
        let config = Config {
            target_dir: PathBuf::from("/definitely/not/here"),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DirToMdError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_validate_missing_output_parent() -> std::io::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = Config {
            target_dir: temp_dir.path().to_path_buf(),
            output_file: temp_dir.path().join("missing/out.md"),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(DirToMdError::Config(_))));

        let config = Config {
            target_dir: temp_dir.path().to_path_buf(),
            output_file: PathBuf::from("out.md"),
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        Ok(())
    }
}

/*!
 * Tests for dir-to-md functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::tempdir;

use crate::config::Config;
use crate::converter::{ConvertError, Converter, Result as ConvertResult};
use crate::error::DirToMdError;
use crate::ignore_rules::IgnoreRules;
use crate::serializer::ContentSerializer;
use crate::stats::Stats;
use crate::writer::{generate, MarkdownWriter};

/// Converter that describes images and rejects PDFs
struct StubConverter;

impl Converter for StubConverter {
    fn convert(&self, path: &Path) -> ConvertResult<String> {
        if path.extension().is_some_and(|e| e == "pdf") {
            return Err(ConvertError::CommandFailed("corrupt pdf".to_string()));
        }
        Ok(format!(
            "# Image\n\nAlt text for {}\n",
            path.file_name().unwrap_or_default().to_string_lossy()
        ))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

// Helper function to create the `proj/` scenario
fn setup_test_directory() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("proj");
    fs::create_dir_all(root.join(".git"))?;

    fs::write(root.join("a.py"), "print(1)")?;
    fs::write(root.join("img.png"), b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")?;

    let mut git_file = File::create(root.join(".git").join("config"))?;
    writeln!(git_file, "[core]\n\trepositoryformatversion = 0")?;

    Ok(temp_dir)
}

fn config_for(root: &Path, output_file: PathBuf) -> Config {
    Config {
        target_dir: root.to_path_buf(),
        output_file,
        num_threads: 1,
        ..Config::default()
    }
}

/// Render the whole document into memory
fn render(config: &Config, serializer: ContentSerializer) -> (String, Stats) {
    let rules = IgnoreRules::load(
        config.ignore_file.as_deref(),
        &config.ignore_patterns,
        &config.output_name(),
    );
    let writer = MarkdownWriter::new(config, &rules, serializer, Arc::new(ProgressBar::hidden()));

    let mut buffer = Vec::new();
    let stats = writer.write_to(&mut buffer).expect("document renders");
    (String::from_utf8(buffer).expect("document is UTF-8"), stats)
}

/// Drop the timestamp line so two runs can be compared byte for byte
fn without_timestamp(document: &str) -> String {
    document
        .lines()
        .filter(|line| !line.starts_with("**Generated**"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn tree_section(document: &str) -> &str {
    let start = document.find("## 📊 Directory Structure").expect("tree heading");
    let end = document[start..].find("---").expect("tree rule") + start;
    &document[start..end]
}

#[test]
fn test_project_scenario_without_converter() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    let config = config_for(&root, temp_dir.path().join("proj_combined.md"));

    let (document, stats) = render(&config, ContentSerializer::new(None));

    assert!(document.starts_with("# 📁 Directory: proj\n"));

    let tree = tree_section(&document);
    assert!(tree.contains("├── a.py"));
    assert!(tree.contains("└── img.png"));
    assert!(!tree.contains(".git"));

    assert!(document.contains("## 🐍 File: a.py"));
    assert!(document.contains("**Path**: `a.py`"));
    assert!(document.contains("**Size**: 8.0 B"));
    assert!(document.contains("**Type**: Python script"));
    assert!(document.contains("```python\nprint(1)\n```\n"));

    assert!(document.contains("## 🖼️ File: img.png"));
    assert!(document.contains("*(Binary file, conversion unavailable)*"));
    assert!(!document.contains("repositoryformatversion"));

    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_dirs, 1);
    assert_eq!(stats.text_files, 1);
    assert_eq!(stats.failed_files, 1);
    assert!(stats.ignored_paths >= 1);
    assert!(document.contains("- **Files**: 2"));

    Ok(())
}

#[test]
fn test_project_scenario_with_converter() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    fs::write(root.join("broken.pdf"), b"%PDF")?;
    let config = config_for(&root, temp_dir.path().join("proj_combined.md"));

    let (document, stats) = render(&config, ContentSerializer::new(Some(Arc::new(StubConverter))));

    assert!(document.contains("*(Converted with stub)*\n\n```markdown\n# Image\n\nAlt text for img.png\n```"));
    assert!(document.contains("*(Conversion failed: Command failed: corrupt pdf)*"));
    assert_eq!(stats.converted_files, 1);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.total_files, 3);

    Ok(())
}

#[test]
fn test_generate_writes_file() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    let output_file = temp_dir.path().join("proj_combined.md");
    let config = config_for(&root, output_file.clone());

    let progress = Arc::new(ProgressBar::hidden());
    let stats = generate(&config, ContentSerializer::new(None), progress.clone())
        .expect("generation succeeds");

    // The bar is sized from the same rules the document uses
    assert_eq!(progress.length(), Some(2));
    assert_eq!(progress.position(), 2);
    assert!(output_file.exists());
    let document = fs::read_to_string(&output_file)?;
    assert!(document.contains("## 📈 Statistics"));
    assert_eq!(stats.total_files, 2);

    Ok(())
}

#[test]
fn test_generate_missing_directory_writes_nothing() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let output_file = temp_dir.path().join("out.md");
    let config = config_for(&temp_dir.path().join("missing"), output_file.clone());

    let result = generate(&config, ContentSerializer::new(None), Arc::new(ProgressBar::hidden()));

    assert!(matches!(result, Err(DirToMdError::PathNotFound(_))));
    assert!(!output_file.exists());

    Ok(())
}

#[test]
fn test_generate_unwritable_output_fails() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    // A directory cannot be opened as the output file
    let output_file = temp_dir.path().join("taken");
    fs::create_dir(&output_file)?;
    let config = config_for(&root, output_file);

    let result = generate(&config, ContentSerializer::new(None), Arc::new(ProgressBar::hidden()));
    assert!(matches!(result, Err(DirToMdError::Output(_))));
    assert!(temp_dir.path().join("taken").is_dir());

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_read_only_previous_output_is_kept() -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    let output_file = temp_dir.path().join("out.md");
    fs::write(&output_file, "previous document\n")?;
    fs::set_permissions(&output_file, fs::Permissions::from_mode(0o444))?;

    // Permission bits do not bind a privileged user
    if fs::OpenOptions::new().write(true).open(&output_file).is_ok() {
        fs::set_permissions(&output_file, fs::Permissions::from_mode(0o644))?;
        return Ok(());
    }

    let config = config_for(&root, output_file.clone());
    let result = generate(&config, ContentSerializer::new(None), Arc::new(ProgressBar::hidden()));

    assert!(matches!(result, Err(DirToMdError::Output(_))));
    assert_eq!(fs::read_to_string(&output_file)?, "previous document\n");

    fs::set_permissions(&output_file, fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_noted() -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("proj");
    let locked = root.join("locked");
    fs::create_dir_all(&locked)?;
    fs::create_dir_all(root.join("z_after"))?;
    fs::write(root.join("a_first.txt"), "first\n")?;
    fs::write(locked.join("hidden.txt"), "hidden\n")?;
    fs::write(root.join("z_after/note.txt"), "after\n")?;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Permission bits do not bind a privileged user
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let config = config_for(&root, temp_dir.path().join("out.md"));
    let (document, stats) = render(&config, ContentSerializer::new(None));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

    let tree = tree_section(&document);
    assert!(tree.contains("├── locked/\n│   └── (cannot access: "));
    assert!(tree.contains("└── z_after/\n    └── note.txt"));

    assert!(document.contains("## 📂 Directory: locked\n\n*(Cannot access directory: "));
    assert!(!document.contains("hidden.txt"));
    assert!(document.contains("## 📂 Directory: z_after"));
    assert!(document.contains("### 📄 File: note.txt"));

    assert_eq!(stats.unreadable_dirs, 1);
    assert_eq!(stats.total_dirs, 3);
    assert_eq!(stats.total_files, 2);
    assert!(document.contains("- **Unreadable directories**: 1"));

    Ok(())
}

#[test]
fn test_wildcard_matching_root_name_keeps_contents() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("build_tools");
    fs::create_dir_all(&root)?;
    fs::write(root.join("main.py"), "print('build')\n")?;
    fs::write(root.join("rebuild.sh"), "make\n")?;

    let config = Config {
        ignore_patterns: vec!["*build*".to_string()],
        ..config_for(&root, temp_dir.path().join("out.md"))
    };
    let (document, stats) = render(&config, ContentSerializer::new(None));

    assert!(document.contains("File: main.py"));
    assert!(!document.contains("rebuild.sh"));
    assert_eq!(stats.total_files, 1);
    assert_eq!(stats.ignored_paths, 1);

    Ok(())
}

#[test]
fn test_deterministic_output() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    fs::create_dir_all(root.join("src/nested"))?;
    fs::write(root.join("src/b.rs"), "fn b() {}\n")?;
    fs::write(root.join("src/a.rs"), "fn a() {}\n")?;
    fs::write(root.join("src/nested/z.md"), "# z\n")?;

    let config = config_for(&root, temp_dir.path().join("out.md"));

    let (first, _) = render(&config, ContentSerializer::new(None));
    let (second, _) = render(&config, ContentSerializer::new(None));
    assert_eq!(without_timestamp(&first), without_timestamp(&second));

    // Files within a directory appear in name order
    let a = first.find("File: a.rs").expect("a.rs section");
    let b = first.find("File: b.rs").expect("b.rs section");
    let z = first.find("File: z.md").expect("z.md section");
    assert!(a < b && b < z);
    assert!(first.contains("## 📂 Directory: src"));
    assert!(first.contains("### 📂 Directory: src / nested"));

    Ok(())
}

#[test]
fn test_ignore_sources() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("proj");
    fs::create_dir_all(root.join("web/app/node_modules/pkg"))?;
    fs::create_dir_all(root.join("__pycache__"))?;
    fs::write(root.join("web/app/node_modules/pkg/index.js"), "module.exports = 1;\n")?;
    fs::write(root.join("web/app/main.js"), "main();\n")?;
    fs::write(root.join("debug.log"), "log line\n")?;
    fs::write(root.join("secret.env"), "KEY=1\n")?;
    fs::write(root.join("__pycache__/m.cpython.pyc"), "x")?;
    fs::write(root.join("keep.txt"), "keep\n")?;

    let rule_file = temp_dir.path().join("rules.txt");
    fs::write(&rule_file, "# comments are skipped\n\n*.env\n")?;

    let config = Config {
        ignore_patterns: vec!["*.log".to_string(), "node_modules".to_string()],
        ignore_file: Some(rule_file),
        ..config_for(&root, temp_dir.path().join("out.md"))
    };

    let (document, stats) = render(&config, ContentSerializer::new(None));

    assert!(!document.contains("debug.log"));
    assert!(!document.contains("secret.env"));
    assert!(!document.contains("node_modules"));
    assert!(!document.contains("index.js"));
    assert!(!document.contains("__pycache__"));
    assert!(document.contains("main.js"));
    assert!(document.contains("keep.txt"));
    assert_eq!(stats.ignored_paths, 4);

    Ok(())
}

#[test]
fn test_rerun_does_not_embed_previous_output() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let root = temp_dir.path().join("proj");
    let output_file = root.join("proj_combined.md");
    let config = config_for(&root, output_file.clone());

    generate(&config, ContentSerializer::new(None), Arc::new(ProgressBar::hidden()))
        .expect("first run");
    generate(&config, ContentSerializer::new(None), Arc::new(ProgressBar::hidden()))
        .expect("second run");

    let document = fs::read_to_string(&output_file)?;
    assert!(!document.contains("proj_combined.md"));
    assert_eq!(document.matches("# 📁 Directory:").count(), 1);

    Ok(())
}

#[test]
fn test_heading_saturation() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("deep");
    let mut dir = root.clone();
    for level in 1..=10 {
        dir = dir.join(format!("d{}", level));
    }
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("leaf.txt"), "bottom\n")?;

    let config = config_for(&root, temp_dir.path().join("out.md"));
    let (document, _) = render(&config, ContentSerializer::new(None));

    for line in document.lines().filter(|l| l.starts_with('#')) {
        let level = line.chars().take_while(|&c| c == '#').count();
        assert!(level <= 6, "heading too deep: {}", line);
    }
    assert!(document.contains("###### 📂 Directory: d1 / d2 / d3 / d4 / d5 / d6 / d7 / d8 / d9 / d10"));
    assert!(document.contains("###### 📄 File: leaf.txt"));

    Ok(())
}

#[test]
fn test_encoding_fallback_in_document() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("enc");
    fs::create_dir_all(&root)?;
    fs::write(root.join("utf8.txt"), "café\n".as_bytes())?;
    fs::write(root.join("bom.txt"), b"\xEF\xBB\xBFcaf\xC3\xA9\n")?;
    fs::write(root.join("latin1.txt"), b"caf\xE9\n")?;
    fs::write(root.join("noise.dat"), [0xFFu8, 0x00, 0xFE, 0x01, 0x02])?;

    let config = config_for(&root, temp_dir.path().join("out.md"));
    let (document, stats) = render(&config, ContentSerializer::new(None));

    assert_eq!(document.matches("```text\ncafé\n```").count(), 3);
    assert!(document.contains("*(Binary file, content cannot be displayed)*"));
    assert_eq!(stats.text_files, 3);
    assert_eq!(stats.failed_files, 1);

    Ok(())
}

#[test]
fn test_content_with_fences_is_contained() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("docs");
    fs::create_dir_all(&root)?;
    fs::write(root.join("README.md"), "# Title\n\n```rust\nfn main() {}\n```\n\n`````\n")?;

    let config = config_for(&root, temp_dir.path().join("out.md"));
    let (document, _) = render(&config, ContentSerializer::new(None));

    assert!(document.contains("``````markdown\n# Title\n"));
    assert!(document.contains("`````\n``````\n"));

    Ok(())
}

#[test]
fn test_empty_directory() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("empty");
    fs::create_dir_all(&root)?;

    let config = config_for(&root, temp_dir.path().join("out.md"));
    let (document, stats) = render(&config, ContentSerializer::new(None));

    assert!(document.contains("## 📊 Directory Structure\n\n```\n\n```\n"));
    assert_eq!(stats.total_dirs, 1);
    assert_eq!(stats.total_files, 0);

    Ok(())
}

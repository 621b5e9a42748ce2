/*!
 * Utility functions for dir-to-md
 */

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::ignore_rules::IgnoreRules;
use crate::scanner::Scanner;

/// Count visible files for progress tracking
pub fn count_files(dir: &Path, rules: &IgnoreRules) -> u64 {
    Scanner::new(dir, rules)
        .walk()
        .map(|visit| visit.files.len() as u64)
        .sum()
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = size as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} TB", value)
}

static TYPE_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".py", "Python script"),
        (".md", "Markdown document"),
        (".txt", "Text file"),
        (".pdf", "PDF document"),
        (".doc", "Word document"),
        (".docx", "Word document"),
        (".xls", "Excel spreadsheet"),
        (".xlsx", "Excel spreadsheet"),
        (".jpg", "JPEG image"),
        (".png", "PNG image"),
        (".gif", "GIF image"),
        (".zip", "Archive"),
        (".json", "JSON data"),
        (".html", "HTML page"),
        (".css", "Stylesheet"),
        (".js", "JavaScript script"),
        (".rs", "Rust source"),
    ])
});

static ICONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".py", "🐍"),
        (".md", "📝"),
        (".txt", "📄"),
        (".pdf", "📕"),
        (".doc", "📘"),
        (".docx", "📘"),
        (".xls", "📊"),
        (".xlsx", "📊"),
        (".jpg", "🖼️"),
        (".png", "🖼️"),
        (".gif", "🖼️"),
        (".zip", "🗜️"),
        (".json", "🗂️"),
        (".html", "🌐"),
        (".css", "🎨"),
        (".js", "⚡"),
        (".java", "☕"),
        (".cpp", "⚙️"),
        (".c", "⚙️"),
        (".go", "🐹"),
        (".rs", "🦀"),
    ])
});

/// Short description of a file type by extension
pub fn file_type_description(extension: &str) -> &'static str {
    TYPE_DESCRIPTIONS
        .get(extension)
        .copied()
        .unwrap_or("Unknown type")
}

/// Emoji shown in file headings
pub fn file_icon(extension: &str) -> &'static str {
    ICONS.get(extension).copied().unwrap_or("📄")
}

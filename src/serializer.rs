/*!
 * File content serialization
 *
 * Decides how each visible file appears in the document: converted through
 * the external converter, embedded as decoded text, or replaced by a note.
 * Text is wrapped in a fence that the content itself can never close.
 */

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use encoding_rs::{Encoding, GBK, WINDOWS_1252};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::converter::Converter;
use crate::types::{Content, RenderedFile};

/// Upper bound for the delimiter search on backtick-only lines
pub const MAX_FENCE_LEN: usize = 20;

/// Bytes inspected when deciding whether a file is binary
const SNIFF_LEN: usize = 8192;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Extensions handed to the converter when one is available
pub static DELEGATE_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Documents
        ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".odt", ".ods", ".odp",
        ".rtf", ".epub", ".mobi", ".azw3",
        // Images
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".svg", ".webp", ".ico",
        ".heic", ".heif",
    ]
    .into_iter()
    .collect()
});

/// Fence language tags by extension
static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".py", "python"),
        (".md", "markdown"),
        (".txt", "text"),
        (".js", "javascript"),
        (".ts", "typescript"),
        (".html", "html"),
        (".css", "css"),
        (".json", "json"),
        (".xml", "xml"),
        (".yaml", "yaml"),
        (".yml", "yaml"),
        (".toml", "toml"),
        (".sh", "bash"),
        (".java", "java"),
        (".c", "c"),
        (".cpp", "cpp"),
        (".go", "go"),
        (".rs", "rust"),
        (".sql", "sql"),
    ])
});

static BACKTICK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("`+").expect("valid regex"));

/// Text produced by a successful decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded text
    pub text: String,
    /// Name of the encoding that succeeded
    pub encoding: &'static str,
}

type DecodeAttempt = fn(&[u8]) -> Option<String>;

/// Encodings tried in order; the first that decodes wins
const DECODE_CHAIN: &[(&str, DecodeAttempt)] = &[
    ("UTF-8", decode_utf8),
    ("UTF-8 with BOM", decode_utf8_bom),
    ("Latin-1", decode_latin1),
    ("Windows-1252", decode_windows_1252),
    ("GBK", decode_gbk),
    ("GB2312", decode_gb2312),
];

/// BOM-prefixed input is left to the BOM-aware attempt so the mark is stripped
fn decode_utf8(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(UTF8_BOM) {
        return None;
    }
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

fn decode_utf8_bom(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// C1 control bytes do not occur in Latin-1 text
fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return None;
    }
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Bytes left undefined by Windows-1252 fail the attempt
fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    if bytes
        .iter()
        .any(|&b| matches!(b, 0x81 | 0x8D | 0x8F | 0x90 | 0x9D))
    {
        return None;
    }
    strict_decode(WINDOWS_1252, bytes)
}

fn decode_gbk(bytes: &[u8]) -> Option<String> {
    strict_decode(GBK, bytes)
}

fn decode_gb2312(bytes: &[u8]) -> Option<String> {
    Encoding::for_label(b"gb2312").and_then(|encoding| strict_decode(encoding, bytes))
}

fn strict_decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Decode bytes with the first encoding in the chain that accepts them
pub fn decode_text(bytes: &[u8]) -> Option<Decoded> {
    DECODE_CHAIN.iter().find_map(|(name, attempt)| {
        attempt(bytes).map(|text| Decoded {
            text,
            encoding: *name,
        })
    })
}

/// Heuristic for binary content: NUL bytes or many control bytes near the start
pub fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    // Count binary characters (0x00-0x08, 0x0E-0x1F)
    let binary_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    binary_count as f32 / sample.len() as f32 >= 0.1
}

/// Length of the longest run of consecutive backticks
pub fn longest_backtick_run(content: &str) -> usize {
    BACKTICK_RUN
        .find_iter(content)
        .map(|m| m.as_str().len())
        .max()
        .unwrap_or(0)
}

/// Choose a backtick delimiter the content cannot close early
pub fn safe_fence(content: &str) -> String {
    let mut len = (longest_backtick_run(content) + 1).max(3);
    let mut fence = "`".repeat(len);

    while len < MAX_FENCE_LEN && content.lines().any(|line| line == fence) {
        len += 1;
        fence = "`".repeat(len);
    }

    fence
}

/// Wrap content in a safe fence tagged with `language`
pub fn fenced_block(content: &str, language: &str) -> String {
    let fence = safe_fence(content);
    let mut block = String::with_capacity(content.len() + 2 * fence.len() + language.len() + 3);
    block.push_str(&fence);
    block.push_str(language);
    block.push('\n');
    block.push_str(content);
    if !content.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&fence);
    block.push('\n');
    block
}

/// Lowercased extension with its leading dot, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Whether files with this extension go to the converter
pub fn is_delegate_extension(extension: &str) -> bool {
    DELEGATE_EXTENSIONS.contains(extension)
}

/// Fence language tag for an extension
pub fn language_for(extension: &str) -> &'static str {
    LANGUAGES.get(extension).copied().unwrap_or("")
}

/// Produces the document payload for individual files
#[derive(Clone, Default)]
pub struct ContentSerializer {
    converter: Option<Arc<dyn Converter>>,
}

impl ContentSerializer {
    /// Create a serializer; `None` disables conversion
    pub fn new(converter: Option<Arc<dyn Converter>>) -> Self {
        Self { converter }
    }

    /// Whether a converter is configured
    pub fn can_convert(&self) -> bool {
        self.converter.is_some()
    }

    /// Serialize one file. Never fails; problems become `Content` variants.
    pub fn serialize(&self, abs_path: &Path, rel_path: &Path) -> RenderedFile {
        let extension = extension_of(abs_path);
        let delegate = is_delegate_extension(&extension);

        let content = match &self.converter {
            Some(converter) if delegate => Self::convert(converter.as_ref(), abs_path),
            _ => Self::read_text(abs_path, delegate),
        };

        if let Some(reason) = content.failure_reason() {
            debug!("{}: {}", rel_path.display(), reason);
        }

        RenderedFile {
            name: abs_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            rel_path: rel_path.to_path_buf(),
            size: fs::metadata(abs_path).ok().map(|m| m.len()),
            language: language_for(&extension),
            extension,
            content,
        }
    }

    fn convert(converter: &dyn Converter, path: &Path) -> Content {
        match converter.convert(path) {
            Ok(text) if text.trim().is_empty() => Content::ConversionEmpty,
            Ok(text) => Content::Converted {
                text,
                converter: converter.name().to_string(),
            },
            Err(e) => Content::ConversionFailed(e.to_string()),
        }
    }

    fn read_text(path: &Path, delegate: bool) -> Content {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return Content::Unreadable(e.to_string()),
        };

        let binary = Content::Binary {
            conversion_unavailable: delegate,
        };
        if looks_binary(&bytes) {
            return binary;
        }

        match decode_text(&bytes) {
            Some(decoded) => Content::Text {
                text: decoded.text,
                encoding: decoded.encoding,
            },
            None => binary,
        }
    }
}

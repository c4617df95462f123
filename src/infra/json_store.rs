// ============================================================
// Layer 6 - JSON Store
// ============================================================
// Reads raw JSON values from disk and writes dictionary rows
// back as a JSON array.
//
// Output options:
//   indent       Some(n) → pretty-printed, n spaces per level
//                None    → compact, one line
//   ensure_ascii false   → UTF-8 text kept as is ("Điều")
//                true    → non-ASCII escaped ("\u0110i\u1ec1u"),
//                          astral characters as surrogate pairs
//
// Key order inside each row is the canonical field order; it
// survives because serde_json is built with preserve_order.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use crate::data::dataset::Row;
use crate::infra::file_type::{resolve_path, FileType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Spaces per nesting level; `None` writes compact JSON
    pub indent:       Option<usize>,
    /// Escape every non-ASCII character as `\uXXXX`
    pub ensure_ascii: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            indent:       Some(4),
            ensure_ascii: false,
        }
    }
}

impl JsonOptions {
    pub fn compact() -> Self {
        Self {
            indent: None,
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn ascii(mut self) -> Self {
        self.ensure_ascii = true;
        self
    }
}

/// Render any serializable value with the given options.
pub fn to_string<T: Serialize + ?Sized>(value: &T, options: JsonOptions) -> Result<String> {
    let text = match options.indent {
        None => serde_json::to_string(value)?,
        Some(width) => {
            let indent = " ".repeat(width);
            let mut buf = Vec::new();
            let mut ser =
                Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
            value.serialize(&mut ser)?;
            String::from_utf8(buf).context("serializer produced invalid UTF-8")?
        }
    };

    Ok(if options.ensure_ascii {
        escape_non_ascii(&text)
    } else {
        text
    })
}

/// Write `rows` as a JSON array to `path` (`.json` appended unless
/// present) and return the path actually written.
pub fn write_rows(path: &Path, rows: &[Row], options: JsonOptions) -> Result<PathBuf> {
    let path = resolve_path(path, FileType::Json);
    let text = to_string(rows, options)?;

    fs::write(&path, text)
        .with_context(|| format!("Cannot write JSON to '{}'", path.display()))?;

    tracing::info!("Wrote {} rows to '{}'", rows.len(), path.display());
    Ok(path)
}

/// Read and parse a JSON file. `.json` is appended to `path`
/// unless already there.
pub fn read_value(path: &Path) -> Result<Value> {
    let path = resolve_path(path, FileType::Json);

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read JSON from '{}'", path.display()))?;

    let value = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))?;

    tracing::debug!("Read JSON from '{}'", path.display());
    Ok(value)
}

/// Escape every non-ASCII char of already-serialized JSON.
///
/// Structural characters are all ASCII, so any non-ASCII char
/// sits inside a string literal where `\uXXXX` is valid.
fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];

    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        for unit in ch.encode_utf16(&mut units) {
            // writing to a String cannot fail
            let _ = write!(out, "\\u{unit:04x}");
        }
    }
    out
}

// ============================================================
// Layer 6 - File Types
// ============================================================
// The two on-disk formats a dataset can be saved to or loaded
// from, and the filename rule both of them share:
//
//   "data"        + Json   → "data.json"
//   "data.json"   + Json   → "data.json"     (already there)
//   "data.JSON"   + Json   → "data.JSON.json" (case-sensitive)
//   "  data  "    + Pickle → "data.pkl"       (whitespace trimmed)
//   "data"        + none   → "data"
//
// Parsing accepts "json", "pickle" and "pkl"; anything else is
// an UnsupportedFileType error rather than a silent no-op.

use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::error::ShapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// A JSON array of dictionary rows
    Json,
    /// A compressed binary snapshot of the entries
    Pickle,
}

impl FileType {
    /// Extension (without the dot) written for this type
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json   => "json",
            Self::Pickle => "pkl",
        }
    }
}

impl FromStr for FileType {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json"          => Ok(Self::Json),
            "pickle" | "pkl" => Ok(Self::Pickle),
            other => Err(ShapeError::UnsupportedFileType(other.to_string())),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trim `filename` and append the type's extension unless the
/// name already ends with it.
pub fn normalize_extension(filename: &str, filetype: Option<FileType>) -> String {
    let name = filename.trim();
    match filetype {
        None => name.to_string(),
        Some(ft) => {
            let suffix = format!(".{}", ft.extension());
            if name.ends_with(&suffix) {
                name.to_string()
            } else {
                format!("{name}{suffix}")
            }
        }
    }
}

/// `normalize_extension` for paths. Non-UTF-8 paths are left
/// untrimmed and only get the extension check.
pub fn resolve_path(path: &Path, filetype: FileType) -> PathBuf {
    match path.to_str() {
        Some(name) => PathBuf::from(normalize_extension(name, Some(filetype))),
        None => {
            if path.extension() == Some(OsStr::new(filetype.extension())) {
                path.to_path_buf()
            } else {
                let mut raw = path.as_os_str().to_owned();
                raw.push(".");
                raw.push(filetype.extension());
                PathBuf::from(raw)
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_types() {
        assert_eq!("json".parse::<FileType>().unwrap(), FileType::Json);
        assert_eq!("pickle".parse::<FileType>().unwrap(), FileType::Pickle);
        assert_eq!("pkl".parse::<FileType>().unwrap(), FileType::Pickle);

        let err = "csv".parse::<FileType>().unwrap_err();
        assert!(matches!(err, ShapeError::UnsupportedFileType(ref t) if t == "csv"));
        assert!("JSON".parse::<FileType>().is_err());
    }

    #[test]
    fn test_extension_is_appended_once() {
        assert_eq!(normalize_extension("data", Some(FileType::Json)), "data.json");
        assert_eq!(normalize_extension("data.json", Some(FileType::Json)), "data.json");
        assert_eq!(normalize_extension("data", Some(FileType::Pickle)), "data.pkl");
        assert_eq!(normalize_extension("data.pkl", Some(FileType::Pickle)), "data.pkl");
    }

    #[test]
    fn test_extension_rules_edge_cases() {
        assert_eq!(normalize_extension("  data  ", Some(FileType::Json)), "data.json");
        assert_eq!(normalize_extension("data.JSON", Some(FileType::Json)), "data.JSON.json");
        assert_eq!(normalize_extension("data.json", Some(FileType::Pickle)), "data.json.pkl");
        assert_eq!(normalize_extension(" data ", None), "data");
    }

    #[test]
    fn test_resolve_path() {
        let dir = Path::new("out");
        assert_eq!(resolve_path(&dir.join("d"), FileType::Json), dir.join("d.json"));
        assert_eq!(resolve_path(&dir.join("d.pkl"), FileType::Pickle), dir.join("d.pkl"));
    }
}

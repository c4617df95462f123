// ============================================================
// Layer 6 - Binary Snapshots
// ============================================================
// Saves and restores a whole Dataset as one compressed binary
// file, the same MessagePack + gzip pairing burn's
// CompactRecorder uses for model records.
//
// What gets saved:
//   magic           fixed tag identifying a dataset snapshot
//   format_version  bumped whenever the layout changes
//   kind            "document" or "qa", checked on load
//   entries         every entry in insertion order
//
// File naming: ".pkl" is appended unless the name ends with it,
// so "train" and "train.pkl" refer to the same snapshot.
//
// Loading fails loudly on a foreign file, a newer format or a
// snapshot of the other kind; it never returns a half-read set.
// The header is decoded and checked before any entry is.

use anyhow::{Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::data::dataset::Dataset;
use crate::domain::entry::Entry;
use crate::infra::file_type::{resolve_path, FileType};

const MAGIC: &str = "vietlegalqa-snapshot";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("not a dataset snapshot")]
    BadMagic,

    #[error("snapshot format version {found} is not supported (expected {})", FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("snapshot holds '{found}' entries, expected '{expected}'")]
    KindMismatch { expected: &'static str, found: String },
}

#[derive(Serialize)]
struct SnapshotOut<'a, E> {
    magic:          &'a str,
    format_version: u32,
    kind:           &'a str,
    entries:        Vec<&'a E>,
}

/// First pass: everything but the entries. Missing keys read as
/// defaults so a foreign map fails the magic check, not the decoder.
#[derive(Deserialize, Default)]
#[serde(default)]
struct SnapshotHeader {
    magic:          String,
    format_version: u32,
    kind:           String,
}

/// Second pass, only once the header has been accepted
#[derive(Deserialize)]
struct SnapshotBody<E> {
    entries: Vec<E>,
}

/// Write `dataset` to `path` (`.pkl` appended unless present)
/// and return the path actually written.
pub fn write<E: Entry>(path: &Path, dataset: &Dataset<E>) -> Result<PathBuf> {
    let path = resolve_path(path, FileType::Pickle);

    let snapshot = SnapshotOut {
        magic:          MAGIC,
        format_version: FORMAT_VERSION,
        kind:           E::KIND,
        entries:        dataset.iter().collect(),
    };

    let file = File::create(&path)
        .with_context(|| format!("Cannot create snapshot '{}'", path.display()))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

    rmp_serde::encode::write_named(&mut encoder, &snapshot)
        .with_context(|| format!("Failed to encode snapshot '{}'", path.display()))?;

    encoder
        .finish()
        .and_then(|mut writer| writer.flush())
        .with_context(|| format!("Failed to finish snapshot '{}'", path.display()))?;

    tracing::info!(
        "Saved {} {} entries to '{}'",
        dataset.len(),
        E::KIND,
        path.display()
    );
    Ok(path)
}

/// Restore a dataset written by `write`. `.pkl` is appended to
/// `path` unless already there.
pub fn read<E: Entry>(path: &Path) -> Result<Dataset<E>> {
    let path = resolve_path(path, FileType::Pickle);

    let file = File::open(&path)
        .with_context(|| format!("Cannot open snapshot '{}'", path.display()))?;
    let mut bytes = Vec::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_end(&mut bytes)
        .with_context(|| format!("Cannot decompress snapshot '{}'", path.display()))?;

    // header first: entries of another kind or version may not decode as E
    let header: SnapshotHeader = rmp_serde::from_slice(&bytes)
        .with_context(|| format!("Cannot decode snapshot header '{}'", path.display()))?;
    check_header(&header, E::KIND)
        .with_context(|| format!("Cannot load snapshot '{}'", path.display()))?;

    let body: SnapshotBody<E> = rmp_serde::from_slice(&bytes)
        .with_context(|| format!("Cannot decode snapshot entries '{}'", path.display()))?;

    let dataset: Dataset<E> = body.entries.into_iter().collect();
    tracing::info!(
        "Loaded {} {} entries from '{}'",
        dataset.len(),
        E::KIND,
        path.display()
    );
    Ok(dataset)
}

fn check_header(header: &SnapshotHeader, expected: &'static str) -> Result<(), SnapshotError> {
    if header.magic != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    if header.format_version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: header.format_version,
        });
    }
    if header.kind != expected {
        return Err(SnapshotError::KindMismatch {
            expected,
            found: header.kind.clone(),
        });
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::document::Document;
    use crate::data::qa_dataset::QaDataset;
    use crate::domain::article::Article;
    use crate::domain::qa_pair::QaPair;

    fn write_raw<T: Serialize>(path: &Path, value: &T) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::fast());
        rmp_serde::encode::write_named(&mut encoder, value).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_document_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Document = [
            Article::new("d2", "Điều 2").with_context(["c"]),
            Article::new("d1", "Điều 1").with_summary(["s"]),
        ]
        .into_iter()
        .collect();

        let written = doc.to_snapshot(dir.path().join("doc")).unwrap();
        assert_eq!(written, dir.path().join("doc.pkl"));

        let back: Document = read(&written).unwrap();
        assert_eq!(back.to_list(), doc.to_list());
        let ids: Vec<_> = back.ids().collect();
        assert_eq!(ids, [Some("d2"), Some("d1")]);
    }

    #[test]
    fn test_qa_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let qa: QaDataset = [QaPair::new("q1", "span")
            .with_article("d1")
            .with_question("Ai?")
            .with_answer("Tôi", 0)]
        .into_iter()
        .collect();

        write(&dir.path().join("qa.pkl"), &qa).unwrap();
        let back: QaDataset = read(&dir.path().join("qa")).unwrap();
        assert_eq!(back["q1"].answer_type(), "SPAN");
        assert_eq!(back.to_list(), qa.to_list());
    }

    #[test]
    fn test_kind_is_checked_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Document = [Article::new("d1", "T")].into_iter().collect();
        let path = doc.to_snapshot(dir.path().join("doc")).unwrap();

        let err = read::<QaPair>(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SnapshotError>(),
            Some(&SnapshotError::KindMismatch {
                expected: "qa",
                found:    "document".to_string(),
            })
        );
    }

    #[test]
    fn test_kind_is_checked_both_ways() {
        let dir = tempfile::tempdir().unwrap();
        let qa: QaDataset = [QaPair::new("q1", "span").with_article("d1")]
            .into_iter()
            .collect();
        let path = qa.to_snapshot(dir.path().join("qa")).unwrap();

        let err = read::<Article>(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnapshotError>(),
            Some(SnapshotError::KindMismatch { expected: "document", .. })
        ));
    }

    #[test]
    fn test_version_is_checked_before_entries_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let legacy_entry = serde_json::json!({"legacy_layout": [1, 2, 3]});

        let path = dir.path().join("legacy.pkl");
        write_raw(&path, &SnapshotOut::<serde_json::Value> {
            magic:          MAGIC,
            format_version: FORMAT_VERSION + 1,
            kind:           "qa",
            entries:        vec![&legacy_entry],
        });

        let err = read::<QaPair>(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SnapshotError>(),
            Some(&SnapshotError::UnsupportedVersion { found: FORMAT_VERSION + 1 })
        );
    }

    #[test]
    fn test_foreign_and_future_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let foreign = dir.path().join("foreign.pkl");
        write_raw(&foreign, &SnapshotOut::<Article> {
            magic:          "something-else",
            format_version: FORMAT_VERSION,
            kind:           "document",
            entries:        Vec::new(),
        });
        let err = read::<Article>(&foreign).unwrap_err();
        assert_eq!(err.downcast_ref::<SnapshotError>(), Some(&SnapshotError::BadMagic));

        let future = dir.path().join("future.pkl");
        write_raw(&future, &SnapshotOut::<Article> {
            magic:          MAGIC,
            format_version: FORMAT_VERSION + 1,
            kind:           "document",
            entries:        Vec::new(),
        });
        let err = read::<Article>(&future).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnapshotError>(),
            Some(SnapshotError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_missing_or_garbled_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read::<Article>(&dir.path().join("absent")).is_err());

        std::fs::write(dir.path().join("junk.pkl"), b"not gzip at all").unwrap();
        assert!(read::<Article>(&dir.path().join("junk")).is_err());
    }
}

// ============================================================
// Layer 4 - Dataset Loaders
// ============================================================
// Builds a Document or QaDataset from one of two places:
//
//   FileSource  a local file
//                 Json   → parse, then from_value() (rows, columns or null)
//                 Pickle → restore a binary snapshot as is
//
//   HubSource   a split of a dataset on a DatasetHub
//                 num_rows → Selection::window() → fetch_rows
//                 → keep every step-th row → from_rows()
//
// Both implement DatasetSource, so callers can hold either one
// without caring where the rows come from. The load_* functions
// are shortcuts for the common cases.
//
// Any failure aborts the load; nothing is partially returned.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::data::dataset::Dataset;
use crate::data::document::Document;
use crate::data::qa_dataset::QaDataset;
use crate::data::selection::Selection;
use crate::domain::article::Article;
use crate::domain::entry::Entry;
use crate::domain::fields::{DocField, FieldMap, QaField};
use crate::domain::qa_pair::QaPair;
use crate::infra::{file_type::FileType, hub::DatasetHub, json_store, snapshot};

/// Anything a dataset of `E` can be loaded from
pub trait DatasetSource<E: Entry> {
    fn load(&self) -> Result<Dataset<E>>;
}

// ─── Local Files ──────────────────────────────────────────────────────────────

pub struct FileSource<E: Entry> {
    path:     PathBuf,
    filetype: FileType,
    fields:   FieldMap<E::Field>,
}

impl<E: Entry> FileSource<E> {
    /// Source reading `path` with canonical field names
    pub fn new(path: impl Into<PathBuf>, filetype: FileType) -> Self {
        Self {
            path: path.into(),
            filetype,
            fields: FieldMap::canonical(),
        }
    }

    /// Read JSON columns/keys under these names instead.
    /// Snapshots ignore field names.
    pub fn with_fields(mut self, fields: FieldMap<E::Field>) -> Self {
        self.fields = fields;
        self
    }
}

impl<E: Entry> DatasetSource<E> for FileSource<E> {
    fn load(&self) -> Result<Dataset<E>> {
        let dataset = match self.filetype {
            FileType::Json => {
                let value = json_store::read_value(&self.path)?;
                Dataset::from_value(&value, &self.fields).with_context(|| {
                    format!("Cannot build {} dataset from '{}'", E::KIND, self.path.display())
                })?
            }
            FileType::Pickle => snapshot::read(&self.path)?,
        };

        tracing::info!(
            "Loaded {} {} entries from '{}'",
            dataset.len(),
            E::KIND,
            self.path.display()
        );
        Ok(dataset)
    }
}

// ─── Hub Splits ───────────────────────────────────────────────────────────────

pub struct HubSource<'h, H, E: Entry> {
    hub:       &'h H,
    path:      String,
    split:     String,
    fields:    FieldMap<E::Field>,
    selection: Selection,
}

impl<'h, H: DatasetHub, E: Entry> HubSource<'h, H, E> {
    /// Every row of `split`, canonical field names
    pub fn new(hub: &'h H, path: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            hub,
            path:      path.into(),
            split:     split.into(),
            fields:    FieldMap::canonical(),
            selection: Selection::All,
        }
    }

    pub fn with_fields(mut self, fields: FieldMap<E::Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection = selection.into();
        self
    }
}

impl<H: DatasetHub, E: Entry> DatasetSource<E> for HubSource<'_, H, E> {
    fn load(&self) -> Result<Dataset<E>> {
        let total = self.hub.num_rows(&self.path, &self.split)?;
        let window = self.selection.window(total)?;

        tracing::debug!(
            "Selecting {} of {} rows from '{}' (split '{}')",
            window.count(),
            total,
            self.path,
            self.split
        );

        let rows: Vec<Value> = self
            .hub
            .fetch_rows(&self.path, &self.split, window.offset, window.length)?
            .into_iter()
            .step_by(window.step)
            .map(Value::Object)
            .collect();

        let dataset = Dataset::from_rows(&rows, &self.fields).with_context(|| {
            format!(
                "Cannot build {} dataset from '{}' (split '{}')",
                E::KIND,
                self.path,
                self.split
            )
        })?;

        tracing::info!(
            "Loaded {} {} entries from '{}' (split '{}')",
            dataset.len(),
            E::KIND,
            self.path,
            self.split
        );
        Ok(dataset)
    }
}

// ─── Shortcuts ────────────────────────────────────────────────────────────────

/// Load a Document from a local file.
/// `fields` renames the JSON keys/columns; `None` means canonical.
pub fn load_document(
    path:     impl AsRef<Path>,
    filetype: FileType,
    fields:   Option<&FieldMap<DocField>>,
) -> Result<Document> {
    load_file::<Article>(path.as_ref(), filetype, fields)
}

/// Load a QaDataset from a local file.
pub fn load_qa(
    path:     impl AsRef<Path>,
    filetype: FileType,
    fields:   Option<&FieldMap<QaField>>,
) -> Result<QaDataset> {
    load_file::<QaPair>(path.as_ref(), filetype, fields)
}

/// Load a Document from a hub split.
pub fn load_document_hub<H: DatasetHub>(
    hub:       &H,
    path:      &str,
    split:     &str,
    fields:    Option<&FieldMap<DocField>>,
    selection: Selection,
) -> Result<Document> {
    load_hub::<H, Article>(hub, path, split, fields, selection)
}

/// Load a QaDataset from a hub split.
pub fn load_qa_hub<H: DatasetHub>(
    hub:       &H,
    path:      &str,
    split:     &str,
    fields:    Option<&FieldMap<QaField>>,
    selection: Selection,
) -> Result<QaDataset> {
    load_hub::<H, QaPair>(hub, path, split, fields, selection)
}

fn load_file<E: Entry>(
    path:     &Path,
    filetype: FileType,
    fields:   Option<&FieldMap<E::Field>>,
) -> Result<Dataset<E>> {
    let mut source = FileSource::<E>::new(path, filetype);
    if let Some(fields) = fields {
        source = source.with_fields(fields.clone());
    }
    source.load()
}

fn load_hub<H: DatasetHub, E: Entry>(
    hub:       &H,
    path:      &str,
    split:     &str,
    fields:    Option<&FieldMap<E::Field>>,
    selection: Selection,
) -> Result<Dataset<E>> {
    let mut source = HubSource::<H, E>::new(hub, path, split).with_selection(selection);
    if let Some(fields) = fields {
        source = source.with_fields(fields.clone());
    }
    source.load()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeError;
    use crate::infra::hub::{MemoryHub, DEFAULT_SPLIT};
    use crate::infra::json_store::JsonOptions;
    use serde_json::json;
    use std::fs;

    fn qa_rows(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| {
                    json!({
                        "id": format!("q{i}"), "article": "d1", "question": format!("Câu {i}?"),
                        "answer": "Có", "start": i, "type": "span", "is_impossible": false
                    })
                })
                .collect(),
        )
    }

    fn hub_with_qa(n: usize) -> MemoryHub {
        let hub = MemoryHub::new();
        hub.insert_value("org/vlqa", DEFAULT_SPLIT, qa_rows(n)).unwrap();
        hub
    }

    fn ids(ds: &QaDataset) -> Vec<&str> {
        ds.ids().flatten().collect()
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Document = [Article::new("d1", "Điều 1").with_context(["c1", "c2"])]
            .into_iter()
            .collect();
        doc.to_json(dir.path().join("doc"), JsonOptions::default()).unwrap();

        // the extension is added on load too
        let back = load_document(dir.path().join("doc"), FileType::Json, None).unwrap();
        assert_eq!(back.to_list(), doc.to_list());
    }

    #[test]
    fn test_json_columns_with_renamed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"doc_id": ["d1", "d2"], "name": ["A", "B"],
                         "abstract": [null, null], "body": [["x"], null]});
        fs::write(dir.path().join("cols.json"), raw.to_string()).unwrap();

        let fields = FieldMap::<DocField>::new(["doc_id", "name", "abstract", "body"]).unwrap();
        let doc = load_document(dir.path().join("cols.json"), FileType::Json, Some(&fields)).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["d1"].context, Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_pickle_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let qa = QaDataset::from_value(&qa_rows(3), &FieldMap::default()).unwrap();
        qa.to_snapshot(dir.path().join("qa")).unwrap();

        let back = load_qa(dir.path().join("qa"), "pkl".parse().unwrap(), None).unwrap();
        assert_eq!(back.to_list(), qa.to_list());
    }

    #[test]
    fn test_wrong_snapshot_kind_is_a_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let qa = QaDataset::from_value(&qa_rows(2), &FieldMap::default()).unwrap();
        qa.to_snapshot(dir.path().join("qa")).unwrap();

        let err = load_document(dir.path().join("qa"), FileType::Pickle, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::SnapshotError>(),
            Some(crate::SnapshotError::KindMismatch { expected: "document", .. })
        ));
    }

    #[test]
    fn test_shape_errors_survive_the_context() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), r#"[{"id": "d1", "title": "T"}]"#).unwrap();

        let err = load_document(dir.path().join("bad.json"), FileType::Json, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShapeError>(),
            Some(ShapeError::MissingField { .. })
        ));

        fs::write(dir.path().join("scalar.json"), "42").unwrap();
        let err = load_document(dir.path().join("scalar"), FileType::Json, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShapeError>(),
            Some(ShapeError::UnsupportedShape("a number"))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_qa(dir.path().join("absent"), FileType::Json, None).is_err());
        assert!(load_qa(dir.path().join("absent"), FileType::Pickle, None).is_err());
    }

    #[test]
    fn test_hub_selection_forms() {
        let hub = hub_with_qa(10);

        let all = load_qa_hub(&hub, "org/vlqa", DEFAULT_SPLIT, None, Selection::All).unwrap();
        assert_eq!(all.len(), 10);

        let first = load_qa_hub(&hub, "org/vlqa", DEFAULT_SPLIT, None, 3_usize.into()).unwrap();
        assert_eq!(ids(&first), ["q0", "q1", "q2"]);

        let range =
            load_qa_hub(&hub, "org/vlqa", DEFAULT_SPLIT, None, (4_usize, 6_usize).into()).unwrap();
        assert_eq!(ids(&range), ["q4", "q5"]);

        let stepped = load_qa_hub(
            &hub,
            "org/vlqa",
            DEFAULT_SPLIT,
            None,
            (1_usize, 8_usize, 3_usize).into(),
        )
        .unwrap();
        assert_eq!(ids(&stepped), ["q1", "q4", "q7"]);
    }

    #[test]
    fn test_hub_selection_past_the_end_fails() {
        let hub = hub_with_qa(4);

        let err = load_qa_hub(&hub, "org/vlqa", DEFAULT_SPLIT, None, 100_usize.into()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShapeError>(),
            Some(ShapeError::SelectionOutOfRange { index: 99, total: 4 })
        ));

        let err = load_document_hub(
            &hub,
            "org/vlqa",
            DEFAULT_SPLIT,
            None,
            Selection::Range { start: 10, end: 20 },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShapeError>(),
            Some(ShapeError::SelectionOutOfRange { total: 4, .. })
        ));

        // the whole split, named explicitly, is fine
        let ds = load_qa_hub(&hub, "org/vlqa", DEFAULT_SPLIT, None, 4_usize.into()).unwrap();
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_hub_zero_step_is_rejected() {
        let hub = hub_with_qa(4);
        let err = load_qa_hub(
            &hub,
            "org/vlqa",
            DEFAULT_SPLIT,
            None,
            Selection::Stepped { start: 0, end: 4, step: 0 },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShapeError>(),
            Some(ShapeError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_hub_unknown_split_fails() {
        let hub = hub_with_qa(2);
        assert!(load_qa_hub(&hub, "org/vlqa", "validation", None, Selection::All).is_err());
    }

    #[test]
    fn test_push_then_load_from_hub() {
        let hub = MemoryHub::new();
        let doc: Document = [Article::new("d1", "Điều 1"), Article::new("d2", "Điều 2")]
            .into_iter()
            .collect();
        doc.push_to(&hub, "me/vlqa-doc", "hf_token").unwrap();

        let back = load_document_hub(&hub, "me/vlqa-doc", DEFAULT_SPLIT, None, Selection::All)
            .unwrap();
        assert_eq!(back.to_list(), doc.to_list());
    }

    #[test]
    fn test_sources_behind_the_trait() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_with_qa(2);
        QaDataset::from_value(&qa_rows(5), &FieldMap::default())
            .unwrap()
            .to_snapshot(dir.path().join("qa"))
            .unwrap();

        let sources: Vec<Box<dyn DatasetSource<QaPair> + '_>> = vec![
            Box::new(FileSource::<QaPair>::new(dir.path().join("qa"), FileType::Pickle)),
            Box::new(HubSource::<_, QaPair>::new(&hub, "org/vlqa", DEFAULT_SPLIT)),
        ];
        let sizes: Vec<usize> = sources.iter().map(|s| s.load().unwrap().len()).collect();
        assert_eq!(sizes, [5, 2]);
    }
}

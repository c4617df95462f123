// ============================================================
// Layer 4 - Generic Dataset
// ============================================================
// An insertion-ordered collection of entries keyed by id.
// Document and QaDataset are this type with a concrete Entry.
//
//   id-keyed access   → dataset["d1"]  (blank entry on a miss)
//                       dataset.get("d1")  (Option)
//   positional access → dataset[0], dataset.at(0), dataset.slice(1..3)
//   mutation          → append / extend, upsert by id
//
// Appending an entry whose id is already present replaces the
// old entry in place: the slot keeps its original position.
// Entries are never removed.
//
// Three raw shapes are accepted by from_value():
//   [ {row}, {row}, ... ]          → from_rows()
//   { "col": [..], "col": [..] }   → from_columns()
//   null                           → empty dataset
//
// Dataset<E> also implements burn's Dataset trait, so it can be
// handed straight to a burn DataLoader.

use anyhow::Result;
use burn::data::dataset::{Dataset as BurnDataset, InMemDataset};
use indexmap::{Equivalent, IndexMap};
use serde_json::{Map, Value};
use std::{
    fmt,
    ops::{Bound, Index, RangeBounds},
    path::{Path, PathBuf},
};

use crate::domain::entry::Entry;
use crate::domain::fields::{FieldKey, FieldMap};
use crate::error::{value_kind, ShapeError};
use crate::infra::{
    hub::{DatasetHub, HfHub, DEFAULT_SPLIT},
    json_store::{self, JsonOptions},
    snapshot,
};

/// A dictionary-form row: canonical field name → value
pub type Row = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct Dataset<E> {
    data:  IndexMap<Option<String>, E>,
    /// Returned by id lookups that miss
    blank: E,
}

/// Borrowed form of an `Option<String>` key.
/// Hashes exactly like the owned key, so lookups need no allocation.
#[derive(Hash)]
struct IdRef<'a>(Option<&'a str>);

impl Equivalent<Option<String>> for IdRef<'_> {
    fn equivalent(&self, key: &Option<String>) -> bool {
        self.0 == key.as_deref()
    }
}

impl<E: Entry> Dataset<E> {
    pub fn new() -> Self {
        Self {
            data:  IndexMap::new(),
            blank: E::default(),
        }
    }

    // ─── Construction ─────────────────────────────────────────────────────────

    /// Build from any of the three raw shapes.
    pub fn from_value(value: &Value, fields: &FieldMap<E::Field>) -> Result<Self, ShapeError> {
        match value {
            Value::Array(rows)    => Self::from_rows(rows, fields),
            Value::Object(columns) => Self::from_columns(columns, fields),
            Value::Null           => Ok(Self::new()),
            other => Err(ShapeError::UnsupportedShape(value_kind(other))),
        }
    }

    /// Build from row-oriented input: one object per record.
    ///
    /// The first row that is not an object, lacks a configured
    /// field, or holds a value of the wrong type aborts the build.
    pub fn from_rows<'a, I>(rows: I, fields: &FieldMap<E::Field>) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut dataset = Self::new();

        for (record, row) in rows.into_iter().enumerate() {
            let row = row.as_object().ok_or(ShapeError::NotARecord { record })?;

            let entry = E::from_lookup(|key| {
                let name = fields.name(key);
                row.get(name).cloned().ok_or_else(|| ShapeError::MissingField {
                    field: name.to_string(),
                    record,
                })
            })?;
            dataset.append(entry);
        }

        tracing::debug!("Built {} {} entries from rows", dataset.len(), E::KIND);
        Ok(dataset)
    }

    /// Build from column-oriented input: one array per field,
    /// all indexed by record position.
    ///
    /// The id column decides how many records there are; any other
    /// column shorter than it aborts the build.
    pub fn from_columns(
        columns: &Map<String, Value>,
        fields:  &FieldMap<E::Field>,
    ) -> Result<Self, ShapeError> {
        let ids = column(columns, fields.name(E::Field::ID))?;
        let mut dataset = Self::new();

        for record in 0..ids.len() {
            let entry = E::from_lookup(|key| {
                let name = fields.name(key);
                column(columns, name)?
                    .get(record)
                    .cloned()
                    .ok_or_else(|| ShapeError::ColumnTooShort {
                        field: name.to_string(),
                        record,
                    })
            })?;
            dataset.append(entry);
        }

        tracing::debug!("Built {} {} entries from columns", dataset.len(), E::KIND);
        Ok(dataset)
    }

    // ─── Access ───────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entry with this id, if present
    pub fn get(&self, id: &str) -> Option<&E> {
        self.data.get(&IdRef(Some(id)))
    }

    /// Entry with this id (which may be absent), or the blank
    /// entry when nothing matches. Never fails.
    pub fn get_or_blank(&self, id: Option<&str>) -> &E {
        self.data.get(&IdRef(id)).unwrap_or(&self.blank)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.data.contains_key(&IdRef(Some(id)))
    }

    /// The "not found" sentinel of this dataset
    pub fn blank(&self) -> &E {
        &self.blank
    }

    /// Entry at an insertion-order position
    pub fn at(&self, index: usize) -> Option<&E> {
        self.data.get_index(index).map(|(_, entry)| entry)
    }

    /// Entries in an insertion-order range, clamped to the dataset
    /// bounds the way a Python slice is: `slice(5..100)` on three
    /// entries is empty rather than a panic.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Vec<&E> {
        let len = self.data.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded    => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded    => len,
        }
        .min(len);

        self.data
            .values()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    /// Every `step`-th entry of `slice(start..end)`.
    /// A zero step is an InvalidSelection error.
    pub fn slice_step(&self, start: usize, end: usize, step: usize) -> Result<Vec<&E>, ShapeError> {
        if step == 0 {
            return Err(ShapeError::InvalidSelection("step must not be zero".to_string()));
        }
        Ok(self.slice(start..end).into_iter().step_by(step).collect())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> indexmap::map::Values<'_, Option<String>, E> {
        self.data.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = Option<&str>> {
        self.data.keys().map(Option::as_deref)
    }

    /// The backing id → entry map
    pub fn as_map(&self) -> &IndexMap<Option<String>, E> {
        &self.data
    }

    // ─── Mutation ─────────────────────────────────────────────────────────────

    /// Insert `entry` under its id, replacing any entry already there.
    pub fn append(&mut self, entry: E) {
        let id = entry.id().map(str::to_string);
        self.data.insert(id, entry);
    }

    /// Append every entry, in order. Later entries win on id collisions.
    pub fn extend<I: IntoIterator<Item = E>>(&mut self, entries: I) {
        for entry in entries {
            self.append(entry);
        }
    }

    // ─── Conversion ───────────────────────────────────────────────────────────

    /// Dictionary form of every entry, in insertion order
    pub fn to_list(&self) -> Vec<Row> {
        self.data.values().map(Entry::to_dict).collect()
    }

    /// Column-oriented form keyed by canonical names.
    /// `from_columns(&to_columns(), &FieldMap::canonical())` rebuilds the dataset.
    pub fn to_columns(&self) -> Map<String, Value> {
        E::Field::ALL
            .iter()
            .map(|&key| (key.name().to_string(), Value::Array(self.column(key))))
            .collect()
    }

    /// One field across all entries, in insertion order
    pub fn column(&self, key: E::Field) -> Vec<Value> {
        self.data.values().map(|entry| entry.get(key)).collect()
    }

    /// In-memory burn dataset of dictionary rows
    pub fn to_dataset(&self) -> InMemDataset<Row> {
        InMemDataset::new(self.to_list())
    }

    // ─── Persistence ──────────────────────────────────────────────────────────

    /// Write the dictionary rows as a JSON array.
    /// `.json` is appended to `path` unless already there;
    /// returns the path actually written.
    pub fn to_json(&self, path: impl AsRef<Path>, options: JsonOptions) -> Result<PathBuf> {
        json_store::write_rows(path.as_ref(), &self.to_list(), options)
    }

    /// Write a binary snapshot (`.pkl` appended unless already there).
    pub fn to_snapshot(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        snapshot::write(path.as_ref(), self)
    }

    /// Push the rows to the Hugging Face hub as the `train` split.
    pub fn push_to_hub(&self, repo_id: &str, token: &str) -> Result<()> {
        let hub = HfHub::from_default_config()?;
        self.push_to(&hub, repo_id, token)
    }

    /// Push the rows through any hub implementation.
    pub fn push_to<H: DatasetHub>(&self, hub: &H, repo_id: &str, token: &str) -> Result<()> {
        tracing::info!("Pushing {} {} entries to '{}'", self.len(), E::KIND, repo_id);
        hub.push_rows(repo_id, token, DEFAULT_SPLIT, &self.to_list())
    }
}

/// Fetch one column of column-oriented input as an array
fn column<'a>(columns: &'a Map<String, Value>, name: &str) -> Result<&'a Vec<Value>, ShapeError> {
    columns
        .get(name)
        .ok_or_else(|| ShapeError::MissingColumn { field: name.to_string() })?
        .as_array()
        .ok_or_else(|| ShapeError::NotAColumn { field: name.to_string() })
}

// ─── Trait Implementations ────────────────────────────────────────────────────

impl<E: Entry> Default for Dataset<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// `dataset["id"]`: the entry, or the blank entry on a miss
impl<E: Entry> Index<&str> for Dataset<E> {
    type Output = E;

    fn index(&self, id: &str) -> &E {
        self.get_or_blank(Some(id))
    }
}

/// `dataset[0]`: positional access, panics when out of range
impl<E: Entry> Index<usize> for Dataset<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.data[index]
    }
}

impl<'a, E: Entry> IntoIterator for &'a Dataset<E> {
    type Item     = &'a E;
    type IntoIter = indexmap::map::Values<'a, Option<String>, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: Entry> Extend<E> for Dataset<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, entries: I) {
        for entry in entries {
            self.append(entry);
        }
    }
}

impl<E: Entry> FromIterator<E> for Dataset<E> {
    fn from_iter<I: IntoIterator<Item = E>>(entries: I) -> Self {
        let mut dataset = Self::new();
        dataset.extend(entries);
        dataset
    }
}

/// Lets a Dataset feed burn's DataLoader directly
impl<E: Entry> BurnDataset<E> for Dataset<E> {
    fn get(&self, index: usize) -> Option<E> {
        self.at(index).cloned()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// Entries' dictionary forms separated by blank lines
impl<E: Entry + fmt::Display> fmt::Display for Dataset<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.data.values().enumerate() {
            if idx > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

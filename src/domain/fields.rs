// ============================================================
// Layer 3 - Field Catalog
// ============================================================
// Canonical column names for both record kinds, and the
// symbolic keys that stand in for them at call sites.
//
// Raw datasets rarely agree on column names. A FieldMap lets a
// caller say "the id lives in `doc_id`, the title in `name`"
// without touching the record types: position 0 is always the
// id, positions 1..N follow the schema's fixed attribute order.
//
//   canonical (documents): id, title, summary, context
//   canonical (QA pairs):  id, article, question, answer,
//                          start, type, is_impossible

use std::{fmt, marker::PhantomData};

use crate::error::ShapeError;

pub const ID_FIELD: &str = "id";

pub const DOC_FIELDS: [&str; 4] = [ID_FIELD, "title", "summary", "context"];

pub const QA_FIELDS: [&str; 7] = [
    ID_FIELD,
    "article",
    "question",
    "answer",
    "start",
    "type",
    "is_impossible",
];

// ─── FieldKey ─────────────────────────────────────────────────────────────────
/// A closed set of symbolic field keys for one record kind.
///
/// `ALL` lists the keys in schema order, so `position()` of a key
/// is also its index in the record's list form and in a FieldMap.
pub trait FieldKey: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// The key at position 0
    const ID: Self;

    /// Canonical column name of this key
    fn name(self) -> &'static str;

    /// Index of this key in schema order
    fn position(self) -> usize;

    /// Look a key up by its canonical name
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }
}

// ─── DocField ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocField {
    Id,
    Title,
    Summary,
    Context,
}

impl FieldKey for DocField {
    const ALL: &'static [Self] = &[Self::Id, Self::Title, Self::Summary, Self::Context];

    const ID: Self = Self::Id;

    fn name(self) -> &'static str {
        match self {
            Self::Id => ID_FIELD,
            Self::Title => "title",
            Self::Summary => "summary",
            Self::Context => "context",
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Id => 0,
            Self::Title => 1,
            Self::Summary => 2,
            Self::Context => 3,
        }
    }
}

// ─── QaField ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QaField {
    Id,
    Article,
    Question,
    Answer,
    Start,
    Type,
    IsImpossible,
}

impl FieldKey for QaField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Article,
        Self::Question,
        Self::Answer,
        Self::Start,
        Self::Type,
        Self::IsImpossible,
    ];

    const ID: Self = Self::Id;

    fn name(self) -> &'static str {
        match self {
            Self::Id => ID_FIELD,
            Self::Article => "article",
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Start => "start",
            Self::Type => "type",
            Self::IsImpossible => "is_impossible",
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Id => 0,
            Self::Article => 1,
            Self::Question => 2,
            Self::Answer => 3,
            Self::Start => 4,
            Self::Type => 5,
            Self::IsImpossible => 6,
        }
    }
}

// ─── FieldMap ─────────────────────────────────────────────────────────────────
/// Ordered raw column names used to read one record kind.
///
/// Built from a caller's list (validated to cover the whole
/// schema, extra names are ignored) or from the canonical names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<K> {
    names: Vec<String>,
    key:   PhantomData<K>,
}

impl<K: FieldKey> FieldMap<K> {
    /// The canonical names, e.g. `["id", "title", "summary", "context"]`
    pub fn canonical() -> Self {
        Self {
            names: K::ALL.iter().map(|key| key.name().to_string()).collect(),
            key:   PhantomData,
        }
    }

    /// Build from a positional list of raw column names.
    pub fn new<I, S>(names: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() < K::ALL.len() {
            return Err(ShapeError::FieldListTooShort {
                given:  names.len(),
                needed: K::ALL.len(),
            });
        }
        Ok(Self { names, key: PhantomData })
    }

    /// Replace the raw name used for a single key
    pub fn rename(mut self, key: K, name: impl Into<String>) -> Self {
        if let Some(slot) = self.names.get_mut(key.position()) {
            *slot = name.into();
        }
        self
    }

    /// Raw column name configured for `key`
    pub fn name(&self, key: K) -> &str {
        self.names
            .get(key.position())
            .map_or_else(|| key.name(), String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<K: FieldKey> Default for FieldMap<K> {
    fn default() -> Self {
        Self::canonical()
    }
}

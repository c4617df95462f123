// ============================================================
// Layer 3 - Article Domain Type
// ============================================================
// One entry of a document dataset: a legal article with its
// title, an optional summary and its body text.
//
// summary and context are kept as lists of paragraphs/sentences
// exactly as the source dataset provides them. Nothing ties the
// two lengths together.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::entry::{decode, fmt_dict, Entry};
use crate::domain::fields::{DocField, FieldKey};
use crate::error::ShapeError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: Option<String>,

    pub title: Option<String>,

    /// Summary sentences, if the source has any
    pub summary: Option<Vec<String>>,

    /// Body paragraphs of the article
    pub context: Option<Vec<String>>,
}

impl Article {
    /// Create an Article with an id and a title; summary and
    /// context start absent and are set with the `with_*` methods.
    ///
    /// Example:
    ///   let art = Article::new("d1", "Điều 1").with_context(["c1", "c2"]);
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id:    Some(id.into()),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_summary<I, S>(mut self, summary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.summary = Some(summary.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = Some(context.into_iter().map(Into::into).collect());
        self
    }
}

impl Entry for Article {
    type Field = DocField;

    const KIND: &'static str = "document";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn get(&self, key: DocField) -> Value {
        match key {
            DocField::Id      => Value::from(self.id.clone()),
            DocField::Title   => Value::from(self.title.clone()),
            DocField::Summary => Value::from(self.summary.clone()),
            DocField::Context => Value::from(self.context.clone()),
        }
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ShapeError>
    where
        F: FnMut(DocField) -> Result<Value, ShapeError>,
    {
        Ok(Self {
            id:      decode(DocField::Id.name(), lookup(DocField::Id)?)?,
            title:   decode(DocField::Title.name(), lookup(DocField::Title)?)?,
            summary: decode(DocField::Summary.name(), lookup(DocField::Summary)?)?,
            context: decode(DocField::Context.name(), lookup(DocField::Context)?)?,
        })
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_dict(self, f)
    }
}

// ============================================================
// Layer 4 - QaDataset
// ============================================================
// A collection of QaPairs keyed by pair id, built the same way
// as a Document but with seven positional fields:
//
//   id, article, question, answer, start, type, is_impossible
//
// On top of the generic Dataset it adds a (loose) membership
// test, single-column projection by name, and the join from a
// pair id to its Article in a Document.

use serde_json::Value;

use crate::data::dataset::{Dataset, Row};
use crate::data::document::Document;
use crate::domain::article::Article;
use crate::domain::entry::Entry;
use crate::domain::fields::QaField;
use crate::domain::qa_pair::QaPair;

pub type QaDataset = Dataset<QaPair>;

/// Result of `QaDataset::to_list_by`
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// One field across all pairs
    Column(Vec<Value>),
    /// Full dictionary rows
    Rows(Vec<Row>),
}

impl Dataset<QaPair> {
    /// Loose membership: true when the pair's article, question,
    /// answer and start EACH occur somewhere in the dataset's
    /// respective columns. They need not come from the same entry;
    /// use `contains_match` for that.
    pub fn contains(&self, pair: &QaPair) -> bool {
        [
            (QaField::Article, pair.get(QaField::Article)),
            (QaField::Question, pair.get(QaField::Question)),
            (QaField::Answer, pair.get(QaField::Answer)),
            (QaField::Start, pair.get(QaField::Start)),
        ]
        .into_iter()
        .all(|(key, value)| self.iter().any(|entry| entry.get(key) == value))
    }

    /// Strict membership: some single entry equals `pair`
    /// (article, question, answer and start all match).
    pub fn contains_match(&self, pair: &QaPair) -> bool {
        self.iter().any(|entry| entry == pair)
    }

    /// Project one column by name, or return the full rows.
    ///
    ///   Some("article" | "question" | "answer" | "start" | "type") → Column
    ///   None, or any other name                                     → Rows
    pub fn to_list_by(&self, key: Option<&str>) -> Projection {
        let key = match key {
            Some("article")  => Some(QaField::Article),
            Some("question") => Some(QaField::Question),
            Some("answer")   => Some(QaField::Answer),
            Some("start")    => Some(QaField::Start),
            Some("type")     => Some(QaField::Type),
            _ => None,
        };

        match key {
            Some(key) => Projection::Column(self.column(key)),
            None      => Projection::Rows(self.to_list()),
        }
    }

    /// Article of the pair with id `pair_id`, or the document's
    /// blank Article when the pair or its article is unknown.
    pub fn get_article<'d>(&self, pair_id: &str, document: &'d Document) -> &'d Article {
        match self.get(pair_id) {
            Some(pair) => pair.get_article(document),
            None       => document.blank(),
        }
    }
}

impl QaPair {
    /// Resolve this pair's article in `document`.
    ///
    /// Never fails: an unknown (or absent) article id yields the
    /// document's blank Article, check it with `is_blank()`.
    pub fn get_article<'d>(&self, document: &'d Document) -> &'d Article {
        document.get_or_blank(self.article.as_deref())
    }
}

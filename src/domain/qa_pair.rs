// ============================================================
// Layer 3 - QaPair Domain Type
// ============================================================
// One question/answer pair asked over an article.
//
//   article  → id of the Article the question is about
//              (a foreign key into a Document, resolved lazily)
//   answer   → answer text, `start` is its offset in the context
//   type     → answer category, always stored upper-cased
//   is_impossible → the question has no answer in the article
//
// Example:
//   article:  "luat-dat-dai-d5"
//   question: "Ai là người sử dụng đất?"
//   answer:   "Tổ chức trong nước"  (start 42, type "SPAN")
//
// Two pairs are equal when article, question, answer and start
// agree; id, type and is_impossible do not take part.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{cmp::Ordering, fmt};

use crate::domain::entry::{decode, fmt_dict, Entry};
use crate::domain::fields::{FieldKey, QaField};
use crate::error::ShapeError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaPair {
    pub id: Option<String>,

    /// Id of the article this pair belongs to
    pub article: Option<String>,

    pub question: Option<String>,

    pub answer: Option<String>,

    /// Offset of the answer inside the article context.
    /// Not checked against the context bounds.
    pub start: Option<i64>,

    /// Upper-cased answer category; empty only on the blank sentinel
    #[serde(rename = "type")]
    answer_type: String,

    #[serde(default)]
    pub is_impossible: bool,
}

impl QaPair {
    /// Create a pair with an id and an answer type.
    /// The type is upper-cased here, so "span" becomes "SPAN".
    pub fn new(id: impl Into<String>, answer_type: impl AsRef<str>) -> Self {
        Self {
            id:          Some(id.into()),
            answer_type: answer_type.as_ref().to_uppercase(),
            ..Self::default()
        }
    }

    /// Create a pair from possibly-absent parts.
    ///
    /// Fails with `MissingAnswerType` when `answer_type` is `None`:
    /// the type cannot be normalized if it is not there.
    pub fn try_new(
        id:            Option<String>,
        article:       Option<String>,
        question:      Option<String>,
        answer:        Option<String>,
        start:         Option<i64>,
        answer_type:   Option<&str>,
        is_impossible: bool,
    ) -> Result<Self, ShapeError> {
        let answer_type = answer_type.ok_or(ShapeError::MissingAnswerType)?;
        Ok(Self {
            id,
            article,
            question,
            answer,
            start,
            answer_type: answer_type.to_uppercase(),
            is_impossible,
        })
    }

    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.article = Some(article.into());
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_answer(mut self, answer: impl Into<String>, start: i64) -> Self {
        self.answer = Some(answer.into());
        self.start  = Some(start);
        self
    }

    pub fn impossible(mut self) -> Self {
        self.is_impossible = true;
        self
    }

    pub fn answer_type(&self) -> &str {
        &self.answer_type
    }

    pub fn set_answer_type(&mut self, answer_type: impl AsRef<str>) {
        self.answer_type = answer_type.as_ref().to_uppercase();
    }

    /// Legacy "less than": true as soon as ANY of article, question,
    /// answer, start (checked in that order) is strictly less than
    /// the other pair's, with no equality check between steps. Two
    /// pairs can each be "less" than the other. Absent values sort
    /// first.
    ///
    /// The `Ord` impl is the lexicographic order over the same fields.
    pub fn any_field_less(&self, other: &Self) -> bool {
        self.article < other.article
            || self.question < other.question
            || self.answer < other.answer
            || self.start < other.start
    }

    /// The fields equality and ordering are defined over
    fn key(&self) -> (Option<&str>, Option<&str>, Option<&str>, Option<i64>) {
        (
            self.article.as_deref(),
            self.question.as_deref(),
            self.answer.as_deref(),
            self.start,
        )
    }
}

impl PartialEq for QaPair {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QaPair {}

impl PartialOrd for QaPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QaPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Entry for QaPair {
    type Field = QaField;

    const KIND: &'static str = "qa";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn get(&self, key: QaField) -> Value {
        match key {
            QaField::Id           => Value::from(self.id.clone()),
            QaField::Article      => Value::from(self.article.clone()),
            QaField::Question     => Value::from(self.question.clone()),
            QaField::Answer       => Value::from(self.answer.clone()),
            QaField::Start        => Value::from(self.start),
            QaField::Type         => Value::from(self.answer_type.clone()),
            QaField::IsImpossible => Value::from(self.is_impossible),
        }
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ShapeError>
    where
        F: FnMut(QaField) -> Result<Value, ShapeError>,
    {
        let id       = decode(QaField::Id.name(), lookup(QaField::Id)?)?;
        let article  = decode(QaField::Article.name(), lookup(QaField::Article)?)?;
        let question = decode(QaField::Question.name(), lookup(QaField::Question)?)?;
        let answer   = decode(QaField::Answer.name(), lookup(QaField::Answer)?)?;
        let start    = decode(QaField::Start.name(), lookup(QaField::Start)?)?;
        let answer_type: Option<String> = decode(QaField::Type.name(), lookup(QaField::Type)?)?;
        let is_impossible: Option<bool> =
            decode(QaField::IsImpossible.name(), lookup(QaField::IsImpossible)?)?;

        Self::try_new(
            id,
            article,
            question,
            answer,
            start,
            answer_type.as_deref(),
            is_impossible.unwrap_or(false),
        )
    }
}

impl fmt::Display for QaPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_dict(self, f)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(article: &str, question: &str, answer: &str, start: i64) -> QaPair {
        QaPair::new("q", "span")
            .with_article(article)
            .with_question(question)
            .with_answer(answer, start)
    }

    #[test]
    fn test_type_is_upper_cased() {
        assert_eq!(QaPair::new("q1", "span").answer_type(), "SPAN");

        let p = QaPair::try_new(None, None, None, None, None, Some("Yes_No"), false).unwrap();
        assert_eq!(p.answer_type(), "YES_NO");

        let mut p = QaPair::new("q1", "span");
        p.set_answer_type("boolean");
        assert_eq!(p.answer_type(), "BOOLEAN");
    }

    #[test]
    fn test_absent_type_is_an_error() {
        let err = QaPair::try_new(Some("q1".into()), None, None, None, None, None, false);
        assert!(matches!(err, Err(ShapeError::MissingAnswerType)));
    }

    #[test]
    fn test_equality_ignores_id_type_and_flag() {
        let a = pair("d1", "who?", "me", 3);
        let mut b = pair("d1", "who?", "me", 3).impossible();
        b.id = Some("other".into());
        b.set_answer_type("yes_no");
        assert_eq!(a, b);

        assert_ne!(a, pair("d1", "who?", "me", 4));
    }

    #[test]
    fn test_ord_is_lexicographic() {
        let a = pair("d1", "b", "x", 9);
        let b = pair("d1", "a", "x", 1);
        // article ties, question decides
        assert!(b < a);
        assert!(a > b);

        let mut pairs = vec![a.clone(), b.clone(), pair("d0", "z", "z", 0)];
        pairs.sort();
        assert_eq!(pairs[0].article.as_deref(), Some("d0"));
        assert_eq!(pairs[1], b);
        assert_eq!(pairs[2], a);
    }

    #[test]
    fn test_any_field_less_is_not_an_order() {
        // article ties; question ordered one way, start the other
        let a = pair("d1", "a", "x", 9);
        let b = pair("d1", "b", "x", 1);

        // a has the smaller question, b the smaller start:
        // the cascade reports each one as less than the other
        assert!(a.any_field_less(&b));
        assert!(b.any_field_less(&a));

        // the trait order only looks at the question here
        assert!(a < b);
        assert!(!(b < a));
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let raw = json!({
            "id": "q1", "article": "d1", "question": "who?", "answer": "me",
            "start": 7, "type": "span", "is_impossible": null
        });
        let p = QaPair::from_lookup(|key| Ok(raw[key.name()].clone())).unwrap();

        assert_eq!(p.id.as_deref(), Some("q1"));
        assert_eq!(p.start, Some(7));
        assert_eq!(p.answer_type(), "SPAN");
        assert!(!p.is_impossible);
        assert_eq!(p.get(QaField::Type), json!("SPAN"));
    }

    #[test]
    fn test_from_lookup_with_null_type_fails() {
        let raw = json!({
            "id": "q1", "article": "d1", "question": "who?", "answer": "me",
            "start": 7, "type": null, "is_impossible": false
        });
        let err = QaPair::from_lookup(|key| Ok(raw[key.name()].clone())).unwrap_err();
        assert!(matches!(err, ShapeError::MissingAnswerType));
    }

    #[test]
    fn test_blank_sentinel() {
        assert!(QaPair::default().is_blank());
        assert!(!QaPair::new("q1", "span").is_blank());
    }
}

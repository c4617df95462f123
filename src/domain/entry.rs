// ============================================================
// Layer 3 - Core Record Abstraction
// ============================================================
// Every record kind (Article, QaPair) implements Entry, and the
// generic Dataset<E> in the data layer is written only against
// this trait. Nothing here knows about files or the hub.
//
// An Entry can be viewed three ways:
//   - by symbolic key   → get(DocField::Title)
//   - as a list         → to_values(), in schema order
//   - as a dictionary   → to_dict(), keyed by canonical names
//
// and built one way: from_lookup(), which pulls each field's raw
// JSON value through a closure. The closure hides whether the
// value came from a row object or from a column array.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::fields::FieldKey;
use crate::error::ShapeError;

pub trait Entry:
    Clone + Default + fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// Symbolic keys of this record kind
    type Field: FieldKey;

    /// Tag stored in binary snapshots so a document snapshot
    /// cannot be restored as a QA dataset (and vice versa)
    const KIND: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);

    /// Value of one field as JSON (`Null` when absent)
    fn get(&self, key: Self::Field) -> Value;

    /// Build a record, asking `lookup` for each field's raw value.
    fn from_lookup<F>(lookup: F) -> Result<Self, ShapeError>
    where
        F: FnMut(Self::Field) -> Result<Value, ShapeError>;

    /// Record-length list form, in schema order
    fn to_values(&self) -> Vec<Value> {
        Self::Field::ALL.iter().map(|&key| self.get(key)).collect()
    }

    /// Dictionary form keyed by canonical field names
    fn to_dict(&self) -> Map<String, Value> {
        Self::Field::ALL
            .iter()
            .map(|&key| (key.name().to_string(), self.get(key)))
            .collect()
    }

    /// Field lookup by canonical name; `None` if the name is not a field
    fn field(&self, name: &str) -> Option<Value> {
        Self::Field::from_name(name).map(|key| self.get(key))
    }

    /// True for the empty sentinel: every field at its default
    fn is_blank(&self) -> bool {
        self.to_values() == Self::default().to_values()
    }
}

/// Decode one raw value into a typed field.
pub(crate) fn decode<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, ShapeError> {
    serde_json::from_value(value).map_err(|e| ShapeError::invalid_value(field, e))
}

/// Write a record's dictionary form as a one-line JSON object.
pub(crate) fn fmt_dict<E: Entry>(entry: &E, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", Value::Object(entry.to_dict()))
}

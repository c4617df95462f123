// ============================================================
// Shape Errors
// ============================================================
// Everything that can go wrong while turning raw rows into
// records, or while interpreting a caller's selector.
//
// I/O, JSON parsing, snapshot decoding and hub transport
// failures are NOT listed here: those surface as anyhow::Error
// with the original error kept as the source, so callers can
// still downcast to std::io::Error, serde_json::Error, etc.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapeError {
    /// A row lacks a configured field name
    #[error("missing field '{field}' in record {record}")]
    MissingField { field: String, record: usize },

    /// Column-oriented input without a configured column
    #[error("missing column '{field}'")]
    MissingColumn { field: String },

    /// Row-oriented input contained something other than an object
    #[error("record {record} is not an object")]
    NotARecord { record: usize },

    /// Column-oriented input where a column is not an array
    #[error("column '{field}' is not an array")]
    NotAColumn { field: String },

    /// Column-oriented input with a column shorter than the id column
    #[error("column '{field}' has no value for record {record}")]
    ColumnTooShort { field: String, record: usize },

    /// A raw value could not be read as the field's type
    #[error("invalid value for field '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("answer type is required")]
    MissingAnswerType,

    #[error("field list has {given} names, the schema needs {needed}")]
    FieldListTooShort { given: usize, needed: usize },

    #[error("unsupported input shape: expected an array of records, an object of columns or null, got {0}")]
    UnsupportedShape(&'static str),

    #[error("unsupported file type '{0}'")]
    UnsupportedFileType(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// A selection reaches a row the split does not have
    #[error("row {index} is out of range for a split of {total} rows")]
    SelectionOutOfRange { index: usize, total: usize },
}

impl ShapeError {
    pub(crate) fn invalid_value(field: &str, source: serde_json::Error) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            source,
        }
    }
}

/// Name of a JSON value's kind, used in shape error messages
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

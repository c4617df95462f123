// ============================================================
// vietlegalqa
// ============================================================
// Article/Document and QaPair/QaDataset records for Vietnamese
// legal question answering, with field-name indirection and
// JSON, snapshot and hub persistence.
//
// Layers, leaf first:
//   error   → ShapeError, the shape/selector failures
//   domain  → records and their field keys (no I/O)
//   data    → Dataset<E> and the loaders
//   infra   → files, snapshots, the hub, configuration
//
// Quick start:
//
//   let doc = load_document("articles", FileType::Json, None)?;
//   let qa  = load_qa("questions", FileType::Json, None)?;
//   let article = qa.get_article("q1", &doc);

pub mod error;
pub mod domain;
pub mod data;
pub mod infra;

pub use data::dataset::{Dataset, Row};
pub use data::document::Document;
pub use data::loader::{
    load_document, load_document_hub, load_qa, load_qa_hub, DatasetSource, FileSource, HubSource,
};
pub use data::qa_dataset::{Projection, QaDataset};
pub use data::selection::Selection;
pub use domain::article::Article;
pub use domain::entry::Entry;
pub use domain::fields::{DocField, FieldKey, FieldMap, QaField};
pub use domain::qa_pair::QaPair;
pub use error::ShapeError;
pub use infra::config::HubConfig;
pub use infra::file_type::FileType;
pub use infra::hub::{DatasetHub, HfHub, MemoryHub, DEFAULT_SPLIT};
pub use infra::json_store::JsonOptions;
pub use infra::snapshot::SnapshotError;

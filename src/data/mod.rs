// ============================================================
// Layer 4 - Data Layer
// ============================================================
// Collections of entries, and the paths that fill them.
//
//   JSON file / snapshot / hub split
//       │
//       ▼
//   loader            → picks the shape path, applies a Selection
//       │
//       ▼
//   Dataset<E>        → insertion-ordered id → entry map
//       │               (Document = Dataset<Article>,
//       │                QaDataset = Dataset<QaPair>)
//       ▼
//   to_list / to_json / to_snapshot / push_to_hub / burn views
//
// Raw field names are resolved through a domain::fields::FieldMap
// on the way in; everything on the way out uses canonical names.

/// The generic collection, its constructors and its outputs
pub mod dataset;

/// Dataset of Articles
pub mod document;

/// Dataset of QaPairs: membership, projection, article join
pub mod qa_dataset;

/// Which rows of a hub split to load
pub mod selection;

/// File and hub loaders
pub mod loader;

// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain record types and the traits they share.
//
// Rules for this layer:
//   - NO file I/O or network calls
//   - NO knowledge of the hub or of snapshot formats
//   - Only structs, enums, and traits (plus serde derives)
//
// The generic collection over these records lives one layer
// down, in `data::dataset`.

/// Canonical field names, symbolic keys, field-name indirection
pub mod fields;

/// The Entry trait every record kind implements
pub mod entry;

/// A document entry: title, summary, context
pub mod article;

/// A question/answer pair over an article
pub mod qa_pair;

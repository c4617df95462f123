// ============================================================
// Layer 4 - Document
// ============================================================
// A collection of Articles keyed by article id.
//
// Built from row-oriented input (one object per article),
// column-oriented input (one array per field) or nothing, with
// the raw column names resolved through a FieldMap<DocField>:
//
//   field[0] → id, field[1] → title,
//   field[2] → summary, field[3] → context

use crate::data::dataset::Dataset;
use crate::domain::article::Article;

pub type Document = Dataset<Article>;

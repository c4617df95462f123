// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that leaves the process:
//
//   file_type.rs    the two on-disk formats and the shared
//                   extension rule (".json" / ".pkl")
//
//   json_store.rs   JSON text in and out; indent and
//                   ASCII-escaping options
//
//   snapshot.rs     whole-dataset binary snapshots,
//                   MessagePack compressed with gzip
//
//   hub.rs          the DatasetHub trait, the Hugging Face
//                   client and an in-process hub
//
//   config.rs       HubConfig, persisted as JSON
//
// Errors here are anyhow::Error with the path or repo attached
// as context; the underlying error stays downcastable.

/// On-disk formats and extension normalization
pub mod file_type;

/// JSON reading and writing
pub mod json_store;

/// Binary dataset snapshots
pub mod snapshot;

/// Remote dataset hubs
pub mod hub;

/// Hub endpoints and paging settings
pub mod config;

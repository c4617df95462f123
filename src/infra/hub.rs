// ============================================================
// Layer 6 - Dataset Hub
// ============================================================
// Reading and publishing dataset splits on a remote hub.
//
// The DatasetHub trait is the seam: loaders and Dataset::push_to
// only ever see these three operations, so the HTTP client can be
// swapped for the in-process MemoryHub in tests.
//
//   num_rows    how many rows a split holds
//   fetch_rows  one window of rows, in split order
//   push_rows   replace a split of a repo with the given rows
//
// HfHub talks to Hugging Face:
//   reads  → datasets-server  GET  /rows?dataset=&config=&split=&offset=&length=
//   writes → hub API          POST /api/repos/create          (409 = exists, fine)
//                             POST /api/datasets/{repo}/commit/{revision}
// A push commits one file, data/{split}.jsonl, one row per line.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{cell::RefCell, collections::HashMap, time::Duration};

use crate::data::dataset::Row;
use crate::error::{value_kind, ShapeError};
use crate::infra::config::HubConfig;

/// Split used when none is named
pub const DEFAULT_SPLIT: &str = "train";

pub trait DatasetHub {
    /// Number of rows in `split` of dataset `path`
    fn num_rows(&self, path: &str, split: &str) -> Result<usize>;

    /// Rows `offset .. offset + length` of the split (fewer when
    /// the split ends first)
    fn fetch_rows(&self, path: &str, split: &str, offset: usize, length: usize) -> Result<Vec<Row>>;

    /// Replace `split` of `repo_id` with `rows`, creating the repo
    /// when it does not exist yet
    fn push_rows(&self, repo_id: &str, token: &str, split: &str, rows: &[Row]) -> Result<()>;
}

// ─── Hugging Face ─────────────────────────────────────────────────────────────

pub struct HfHub {
    client: Client,
    config: HubConfig,
}

#[derive(Deserialize)]
struct RowsPage {
    rows:           Vec<RowItem>,
    num_rows_total: usize,
}

#[derive(Deserialize)]
struct RowItem {
    #[serde(default)]
    row_idx:         usize,
    row:             Row,
    /// Cells the server shortened; such a row is not the real record
    #[serde(default)]
    truncated_cells: Vec<String>,
}

impl HfHub {
    pub fn new(config: HubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("vietlegalqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// Client for the public Hugging Face endpoints
    pub fn from_default_config() -> Result<Self> {
        Self::new(HubConfig::default())
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    fn rows_page(&self, path: &str, split: &str, offset: usize, length: usize) -> Result<RowsPage> {
        let url = format!("{}/rows", self.config.rows_endpoint);
        let (offset, length) = (offset.to_string(), length.to_string());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("dataset", path),
                ("config", self.config.config_name.as_str()),
                ("split", split),
                ("offset", offset.as_str()),
                ("length", length.as_str()),
            ])
            .send()
            .with_context(|| format!("Failed to reach the rows endpoint for '{path}'"))?;

        if !response.status().is_success() {
            bail!(
                "Hub returned {} for rows of '{}' (split '{}')",
                response.status(),
                path,
                split
            );
        }

        response
            .json()
            .with_context(|| format!("Failed to parse rows of '{path}'"))
    }

    fn create_repo(&self, repo_id: &str, token: &str) -> Result<()> {
        let (organization, name) = match repo_id.split_once('/') {
            Some((org, name)) => (Some(org), name),
            None              => (None, repo_id),
        };

        let response = self
            .client
            .post(format!("{}/api/repos/create", self.config.endpoint))
            .bearer_auth(token)
            .json(&json!({
                "type":         "dataset",
                "name":         name,
                "organization": organization,
                "private":      self.config.private,
            }))
            .send()
            .with_context(|| format!("Failed to reach the hub to create '{repo_id}'"))?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!("Created dataset repo '{}'", repo_id);
                Ok(())
            }
            status if status == StatusCode::CONFLICT => {
                tracing::debug!("Dataset repo '{}' already exists", repo_id);
                Ok(())
            }
            status => bail!("Hub returned {} while creating '{}'", status, repo_id),
        }
    }

    fn commit_split(&self, repo_id: &str, token: &str, split: &str, rows: &[Row]) -> Result<()> {
        let body = commit_body(split, rows)?;
        let url = format!(
            "{}/api/datasets/{}/commit/{}",
            self.config.endpoint, repo_id, self.config.revision
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .with_context(|| format!("Failed to reach the hub to commit to '{repo_id}'"))?;

        if !response.status().is_success() {
            bail!("Hub returned {} while committing to '{}'", response.status(), repo_id);
        }
        Ok(())
    }
}

impl DatasetHub for HfHub {
    fn num_rows(&self, path: &str, split: &str) -> Result<usize> {
        Ok(self.rows_page(path, split, 0, 1)?.num_rows_total)
    }

    fn fetch_rows(&self, path: &str, split: &str, offset: usize, length: usize) -> Result<Vec<Row>> {
        let page_size = self.config.effective_page_size();
        let rows = fetch_paged(offset, length, page_size, |at, want| {
            let page = self.rows_page(path, split, at, want)?;
            tracing::debug!("Fetched {} rows of '{}' at offset {}", page.rows.len(), path, at);
            Ok(page.rows)
        })
        .with_context(|| format!("Cannot fetch rows of '{path}' (split '{split}')"))?;

        Ok(rows)
    }

    fn push_rows(&self, repo_id: &str, token: &str, split: &str, rows: &[Row]) -> Result<()> {
        self.create_repo(repo_id, token)?;
        self.commit_split(repo_id, token, split, rows)?;
        tracing::info!("Pushed {} rows to '{}' (split '{}')", rows.len(), repo_id, split);
        Ok(())
    }
}

/// Collect rows `offset .. offset + length`, asking `fetch_page`
/// for at most `page_size` rows at a time. An empty page ends the
/// split early. A row with truncated cells fails the whole fetch.
fn fetch_paged<F>(offset: usize, length: usize, page_size: usize, mut fetch_page: F) -> Result<Vec<Row>>
where
    F: FnMut(usize, usize) -> Result<Vec<RowItem>>,
{
    let mut rows = Vec::with_capacity(length.min(page_size));

    while rows.len() < length {
        let want = page_size.min(length - rows.len());
        let page = fetch_page(offset + rows.len(), want)?;
        if page.is_empty() {
            break;
        }

        for item in page {
            if !item.truncated_cells.is_empty() {
                bail!(
                    "Row {} was truncated by the server (cells: {})",
                    item.row_idx,
                    item.truncated_cells.join(", ")
                );
            }
            rows.push(item.row);
        }
    }

    rows.truncate(length);
    Ok(rows)
}

/// Rows as JSON Lines, one object per line
pub fn to_jsonl(rows: &[Row]) -> Result<String> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}

/// NDJSON commit payload: a header line, then one file operation
/// carrying the split as base64-encoded JSON Lines.
fn commit_body(split: &str, rows: &[Row]) -> Result<String> {
    let header = json!({
        "key":   "header",
        "value": { "summary": format!("Upload {split} split"), "description": "" },
    });
    let file = json!({
        "key":   "file",
        "value": {
            "path":     format!("data/{split}.jsonl"),
            "encoding": "base64",
            "content":  STANDARD.encode(to_jsonl(rows)?),
        },
    });
    Ok(format!("{header}\n{file}\n"))
}

// ─── In-Process Hub ───────────────────────────────────────────────────────────

/// A hub held in memory: splits keyed by (dataset path, split).
/// Pushes replace a split; reads see what was pushed or seeded.
#[derive(Debug, Default)]
pub struct MemoryHub {
    splits: RefCell<HashMap<(String, String), Vec<Row>>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a split with rows
    pub fn insert(&self, path: impl Into<String>, split: impl Into<String>, rows: Vec<Row>) {
        self.splits.borrow_mut().insert((path.into(), split.into()), rows);
    }

    /// Seed a split from a JSON array of objects
    pub fn insert_value(
        &self,
        path:  impl Into<String>,
        split: impl Into<String>,
        rows:  Value,
    ) -> Result<(), ShapeError> {
        let items = match rows {
            Value::Array(items) => items,
            other => return Err(ShapeError::UnsupportedShape(value_kind(&other))),
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(record, item)| match item {
                Value::Object(row) => Ok(row),
                _ => Err(ShapeError::NotARecord { record }),
            })
            .collect::<Result<Vec<Row>, ShapeError>>()?;

        self.insert(path, split, rows);
        Ok(())
    }

    /// Copy of a split's rows, if it exists
    pub fn rows(&self, path: &str, split: &str) -> Option<Vec<Row>> {
        self.splits
            .borrow()
            .get(&(path.to_string(), split.to_string()))
            .cloned()
    }

    fn with_split<T>(&self, path: &str, split: &str, f: impl FnOnce(&[Row]) -> T) -> Result<T> {
        let splits = self.splits.borrow();
        match splits.get(&(path.to_string(), split.to_string())) {
            Some(rows) => Ok(f(rows)),
            None => bail!("Dataset '{}' has no split '{}'", path, split),
        }
    }
}

impl DatasetHub for MemoryHub {
    fn num_rows(&self, path: &str, split: &str) -> Result<usize> {
        self.with_split(path, split, <[Row]>::len)
    }

    fn fetch_rows(&self, path: &str, split: &str, offset: usize, length: usize) -> Result<Vec<Row>> {
        self.with_split(path, split, |rows| {
            rows.iter().skip(offset).take(length).cloned().collect()
        })
    }

    fn push_rows(&self, repo_id: &str, token: &str, split: &str, rows: &[Row]) -> Result<()> {
        if token.is_empty() {
            bail!("A token is required to push to '{}'", repo_id);
        }
        self.insert(repo_id, split, rows.to_vec());
        Ok(())
    }
}

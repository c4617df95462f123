// ============================================================
// Layer 6 - Hub Configuration
// ============================================================
// Where and how to talk to the Hugging Face hub. Every field has
// a default, so a partial JSON file (or none at all) works:
//
//   {
//     "endpoint":      "https://huggingface.co",
//     "rows_endpoint": "https://datasets-server.huggingface.co",
//     "config_name":   "default",
//     "revision":      "main",
//     "page_size":     100,
//     "timeout_secs":  60,
//     "private":       false
//   }
//
// Load one with HubConfig::load() and hand it to HfHub::new().

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Largest page the datasets-server rows endpoint will serve
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Hub API root, used for repo creation and commits
    pub endpoint:      String,
    /// Datasets-server root, used for reading rows
    pub rows_endpoint: String,
    /// Dataset configuration (subset) to read
    pub config_name:   String,
    /// Branch pushes are committed to
    pub revision:      String,
    /// Rows per request when reading, at most MAX_PAGE_SIZE
    pub page_size:     usize,
    pub timeout_secs:  u64,
    /// Create pushed repos as private
    pub private:       bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint:      "https://huggingface.co".to_string(),
            rows_endpoint: "https://datasets-server.huggingface.co".to_string(),
            config_name:   "default".to_string(),
            revision:      "main".to_string(),
            page_size:     MAX_PAGE_SIZE,
            timeout_secs:  60,
            private:       false,
        }
    }
}

impl HubConfig {
    /// Read a config file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read hub config from '{}'", path.display()))?;

        let cfg = serde_json::from_str(&json)
            .with_context(|| format!("Invalid hub config in '{}'", path.display()))?;

        tracing::debug!("Loaded hub config from '{}'", path.display());
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        fs::write(path, json)
            .with_context(|| format!("Cannot write hub config to '{}'", path.display()))?;

        tracing::debug!("Saved hub config to '{}'", path.display());
        Ok(())
    }

    /// Page size clamped to what the rows endpoint accepts
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.json");

        let cfg = HubConfig {
            config_name: "vi".to_string(),
            page_size:   25,
            ..HubConfig::default()
        };
        cfg.save(&path).unwrap();

        assert_eq!(HubConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.json");
        fs::write(&path, r#"{"revision": "dev"}"#).unwrap();

        let cfg = HubConfig::load(&path).unwrap();
        assert_eq!(cfg.revision, "dev");
        assert_eq!(cfg.config_name, "default");
        assert_eq!(cfg.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HubConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Cannot read hub config"));
    }

    #[test]
    fn test_page_size_is_clamped() {
        let mut cfg = HubConfig::default();
        cfg.page_size = 0;
        assert_eq!(cfg.effective_page_size(), 1);
        cfg.page_size = 1000;
        assert_eq!(cfg.effective_page_size(), MAX_PAGE_SIZE);
    }
}

/// Application configuration
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Runtime configuration, loaded from a JSON file. Every field has a
/// default so a partial (or absent) file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Where the raw catalog comes from: an http(s) URL or a file path.
    #[serde(default = "default_catalog_source")]
    pub catalog_source: String,

    /// Sqlite database holding the selection snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Snapshots older than this are ignored on restore.
    #[serde(default = "default_snapshot_ttl_days")]
    pub snapshot_ttl_days: i64,

    /// Field-of-study labels sorted to the front of the filter vocabulary.
    #[serde(default)]
    pub priority_fields: Vec<String>,

    /// Terms whose selection lists exist even when empty.
    #[serde(default = "default_base_terms")]
    pub base_terms: Vec<i32>,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_catalog_source() -> String {
    "courses.json".to_string()
}

fn default_snapshot_path() -> String {
    "selection.db".to_string()
}

fn default_snapshot_ttl_days() -> i64 {
    7
}

fn default_base_terms() -> Vec<i32> {
    vec![1, 2]
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            catalog_source: default_catalog_source(),
            snapshot_path: default_snapshot_path(),
            snapshot_ttl_days: default_snapshot_ttl_days(),
            priority_fields: Vec::new(),
            base_terms: default_base_terms(),
        }
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tracking store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "d_backend")]
    pub backend: StoreBackendKind,
    /// JSON table file used by the `file` backend.
    #[serde(default = "d_store_path")]
    pub path: PathBuf,
    #[serde(default = "d_table_name")]
    pub table_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    /// Process-local table, lost on restart.
    Memory,
    /// Process-local table persisted to a JSON file after every write.
    File,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: d_backend(),
            path: d_store_path(),
            table_name: d_table_name(),
        }
    }
}

fn d_backend() -> StoreBackendKind {
    StoreBackendKind::File
}
fn d_store_path() -> PathBuf {
    PathBuf::from("./data/trackings.json")
}
fn d_table_name() -> String {
    "Tracking".into()
}

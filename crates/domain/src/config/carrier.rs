use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Carrier lookup service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    #[serde(default = "d_mode")]
    pub mode: CarrierMode,
    #[serde(default = "d_carrier_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    /// Canned results for `mode = "static"`, keyed by composite key
    /// (`"<carrier>_<number>"`).
    #[serde(default)]
    pub static_results: BTreeMap<String, StaticResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierMode {
    /// Query the tracking lookup service over HTTP.
    Rest,
    /// Answer from `static_results`; never touches the network.
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticResult {
    pub success: bool,
    pub status: String,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            mode: d_mode(),
            base_url: d_carrier_url(),
            api_key: None,
            timeout_ms: 8000,
            static_results: BTreeMap::new(),
        }
    }
}

fn d_mode() -> CarrierMode {
    CarrierMode::Rest
}
fn d_carrier_url() -> String {
    "http://localhost:8080".into()
}
fn d_8000() -> u64 {
    8000
}

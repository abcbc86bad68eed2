mod carrier;
mod conversation;
mod observability;
mod server;
mod store;

pub use carrier::*;
pub use conversation::*;
pub use observability::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();
        self.server.check(&mut issues);
        self.store.check(&mut issues);
        self.carrier.check(&mut issues);

        if self.conversation.greetings.iter().all(|g| g.trim().is_empty()) {
            issues.push(ConfigError::error(
                "conversation.greetings",
                "at least one non-empty greeting is required",
            ));
        }

        self.observability.check(&mut issues);

        issues
    }
}

impl ObservabilityConfig {
    fn check(&self, issues: &mut Vec<ConfigError>) {
        if !(0.0..=1.0).contains(&self.sample_rate) {
            issues.push(ConfigError::error(
                "observability.sample_rate",
                "sample_rate must be between 0.0 and 1.0",
            ));
        }
        if self.export_endpoint().is_some() && self.service_name.trim().is_empty() {
            issues.push(ConfigError::warning(
                "observability.service_name",
                "spans will be exported without a service name",
            ));
        }
    }
}

impl ServerConfig {
    fn check(&self, issues: &mut Vec<ConfigError>) {
        if self.port == 0 {
            issues.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.host.is_empty() {
            issues.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.max_concurrent_requests == 0 {
            issues.push(ConfigError::error(
                "server.max_concurrent_requests",
                "must be greater than 0",
            ));
        }
        if self.cors.allowed_origins.iter().any(|o| o == "*") {
            issues.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }
        if let Some(rl) = &self.rate_limit {
            if rl.requests_per_second == 0 || rl.burst_size == 0 {
                issues.push(ConfigError::error(
                    "server.rate_limit",
                    "requests_per_second and burst_size must be greater than 0",
                ));
            }
        }
    }
}

impl StoreConfig {
    fn check(&self, issues: &mut Vec<ConfigError>) {
        if self.table_name.is_empty() {
            issues.push(ConfigError::error("store.table_name", "table_name must not be empty"));
        }
        match self.backend {
            StoreBackendKind::Memory => issues.push(ConfigError::warning(
                "store.backend",
                "memory backend loses every tracking on restart",
            )),
            StoreBackendKind::File => {
                if self.path.as_os_str().is_empty() {
                    issues.push(ConfigError::error("store.path", "path must not be empty"));
                }
            }
        }
    }
}

impl CarrierConfig {
    fn check(&self, issues: &mut Vec<ConfigError>) {
        match self.mode {
            CarrierMode::Rest if self.base_url.is_empty() => issues.push(ConfigError::error(
                "carrier.base_url",
                "base_url must not be empty in rest mode",
            )),
            CarrierMode::Static if self.static_results.is_empty() => {
                issues.push(ConfigError::warning(
                    "carrier.static_results",
                    "static mode with no results: every number reads as not registered",
                ))
            }
            _ => {}
        }
        if self.timeout_ms == 0 {
            issues.push(ConfigError::error("carrier.timeout_ms", "must be greater than 0"));
        }
        for key in self.static_results.keys() {
            if !key.contains(crate::tracking::KEY_DELIMITER) {
                issues.push(ConfigError::error(
                    format!("carrier.static_results.{key}"),
                    "key must be \"<carrier>_<number>\"",
                ));
            }
        }
    }
}

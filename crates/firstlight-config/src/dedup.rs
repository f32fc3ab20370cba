//! Duplicate-suppression configuration.

use firstlight_core::enums::DedupPolicy;
use serde::{Deserialize, Serialize};

fn default_resolver_url() -> String {
    "https://api.ztf.fink-portal.org/api/v1/resolver".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DedupConfig {
    /// How resolver transport/parse failures are treated.
    #[serde(default)]
    pub policy: DedupPolicy,

    /// Reverse-resolver endpoint (object id → registry counterpart).
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            policy: DedupPolicy::default(),
            resolver_url: default_resolver_url(),
        }
    }
}

//! TNS bot credentials and reporter identity.
//!
//! Credentials are explicit configuration handed to the registry client
//! constructor; request-handling code never reads ambient environment state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TnsConfig {
    /// Numeric bot id assigned by TNS (0 = unset).
    #[serde(default)]
    pub bot_id: i64,

    /// Bot name as registered with TNS.
    #[serde(default)]
    pub bot_name: String,

    /// Bot API key.
    #[serde(default)]
    pub api_key: String,

    /// API base URL (e.g. `https://sandbox.wis-tns.org/api`), no trailing slash.
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub reporter_name: String,

    #[serde(default)]
    pub reporter_email: String,

    #[serde(default)]
    pub reporter_institution: String,
}

impl TnsConfig {
    /// Check whether the four fields required for any API call are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.bot_id != 0
            && !self.bot_name.is_empty()
            && !self.api_key.is_empty()
            && !self.api_url.is_empty()
    }

    /// API URL with any trailing slash removed.
    #[must_use]
    pub fn api_url_trimmed(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

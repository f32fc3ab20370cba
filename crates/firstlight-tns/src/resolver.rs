//! Reverse lookup against the Fink resolver.
//!
//! Given only an object id, asks whether a TNS counterpart already exists.
//! An empty response means no match. How transport failures are treated is
//! the caller's policy decision (fail-open vs fail-closed), so this module
//! reports them as errors rather than deciding.

use serde_json::Value;
use std::time::Duration;

use crate::error::RegistryError;

/// Seam for the remote dedup layer; lets tests fake both branches.
pub trait ReverseResolver {
    /// `Ok(Some(_))` when a counterpart exists, `Ok(None)` when it does not.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on transport or parse failure.
    fn reverse_lookup(
        &self,
        object_id: &str,
    ) -> impl Future<Output = Result<Option<Value>, RegistryError>> + Send;
}

/// HTTP client for the Fink portal resolver endpoint.
pub struct FinkResolver {
    http: reqwest::Client,
    url: String,
}

impl FinkResolver {
    /// Create a resolver client for the given endpoint URL.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("reqwest client should build"),
            url: url.into(),
        }
    }
}

impl ReverseResolver for FinkResolver {
    async fn reverse_lookup(&self, object_id: &str) -> Result<Option<Value>, RegistryError> {
        let payload = serde_json::json!({
            "resolver": "tns",
            "reverse": true,
            "name": object_id,
        });
        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = resp.json().await?;
        Ok(non_empty(body))
    }
}

/// Treat JSON null, `[]`, `{}`, and `""` as "no counterpart".
fn non_empty(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(ref a) if a.is_empty() => None,
        Value::Object(ref m) if m.is_empty() => None,
        Value::String(ref s) if s.is_empty() => None,
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_shapes_mean_no_match() {
        assert_eq!(non_empty(serde_json::json!(null)), None);
        assert_eq!(non_empty(serde_json::json!([])), None);
        assert_eq!(non_empty(serde_json::json!({})), None);
        assert_eq!(non_empty(serde_json::json!("")), None);
    }

    #[test]
    fn populated_shapes_mean_match() {
        let hit = serde_json::json!([{"d:tns": "SN 2021abc"}]);
        assert_eq!(non_empty(hit.clone()), Some(hit));
    }
}

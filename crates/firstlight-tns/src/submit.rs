//! AT report submission with endpoint fallback.
//!
//! Response classification drives the rotation: a 2xx ends the attempt with
//! success; a 400/422 from a live endpoint is terminal (rotating further
//! could duplicate-submit); anything else moves to the next candidate URL
//! unless the caller pinned a specific one.

use crate::TnsClient;
use crate::endpoints::SUBMIT_CANDIDATES;
use crate::error::RegistryError;
use crate::report::AtReport;

/// What one submission response means for the rotation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// 2xx — report accepted.
    Success,
    /// 400/422 — live endpoint, bad payload. Stop rotating.
    Terminal,
    /// Anything else — remember the error and try the next candidate.
    Rotate,
}

impl SubmitDisposition {
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            400 | 422 => Self::Terminal,
            _ => Self::Rotate,
        }
    }
}

impl TnsClient {
    /// Submit an AT report.
    ///
    /// With `submit_url` pinned (from a startup probe), only that URL is
    /// tried; otherwise the candidate list is rotated in order.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Disabled`] when credentials are missing.
    /// - [`RegistryError::Rejected`] on HTTP 400/422 (terminal, no rotation).
    /// - [`RegistryError::Exhausted`] when every candidate failed.
    pub async fn submit_at_report(
        &self,
        report: &AtReport,
        submit_url: Option<&str>,
    ) -> Result<serde_json::Value, RegistryError> {
        if !self.is_enabled() {
            return Err(RegistryError::Disabled);
        }

        let payload = report.envelope().to_string();
        let urls: Vec<String> = submit_url.map_or_else(
            || {
                SUBMIT_CANDIDATES
                    .iter()
                    .map(|suffix| format!("{}/{suffix}", self.config().api_url_trimmed()))
                    .collect()
            },
            |pinned| vec![pinned.to_string()],
        );

        let mut last_error = String::from("no candidate URLs");
        for url in &urls {
            let form = reqwest::multipart::Form::new()
                .text("api_key", self.config().api_key.clone())
                .text("data", payload.clone());

            let resp = match self.http().post(url).multipart(form).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(url, error = %e, "submission transport error");
                    last_error = format!("{url}: transport error: {e}");
                    continue;
                }
            };

            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let detail = parse_body(&body, status, url);

            match SubmitDisposition::from_status(status) {
                SubmitDisposition::Success => return Ok(detail),
                SubmitDisposition::Terminal => {
                    return Err(RegistryError::Rejected {
                        status,
                        body: detail.to_string(),
                    });
                }
                SubmitDisposition::Rotate => {
                    tracing::warn!(url, status, "submission failed, trying next candidate");
                    last_error = format!("{url}: HTTP {status}: {detail}");
                }
            }
        }

        Err(RegistryError::Exhausted { last: last_error })
    }
}

/// Parse the response body as JSON, falling back to a wrapper object that
/// carries a truncated raw excerpt.
fn parse_body(body: &str, status: u16, url: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|_| {
        let excerpt: String = body.chars().take(500).collect();
        serde_json::json!({ "raw": excerpt, "status_code": status, "url": url })
    })
}

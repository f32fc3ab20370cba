//! Endpoint discovery by probing.
//!
//! Each candidate gets a minimal POST (syntactically valid, semantically
//! empty payload). A candidate is accepted when the response looks like a
//! live API endpoint rather than a missing route or an HTML error page.
//! Probing never raises: transport failures count as "rejected, try next".

use reqwest::header::CONTENT_TYPE;

use crate::endpoints::{STATUS_CANDIDATES, SUBMIT_CANDIDATES};
use crate::error::RegistryError;
use crate::TnsClient;

/// Result of probing both endpoint families.
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    /// First accepted submission endpoint, if any.
    pub submit_url: Option<String>,
    /// First accepted status endpoint, if any.
    pub status_url: Option<String>,
    /// One human-readable note per candidate tried.
    pub notes: Vec<String>,
}

/// Classification of one probe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    Accepted,
    Rejected,
}

impl ProbeVerdict {
    /// Classify a response by status code and content type.
    ///
    /// 404/405 mean the route does not exist; a structured (JSON) body means
    /// a live endpoint even when the status is an error; `text/html` usually
    /// means an auth wall or a generic error page. Anything else is accepted
    /// conservatively.
    #[must_use]
    pub fn from_response_parts(status: u16, content_type: Option<&str>) -> Self {
        if status == 404 || status == 405 {
            return Self::Rejected;
        }
        match content_type {
            Some(ct) if ct.contains("json") => Self::Accepted,
            Some(ct) if ct.contains("text/html") => Self::Rejected,
            _ => Self::Accepted,
        }
    }

    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl TnsClient {
    /// Probe submit and status candidates, returning the first accepted URL
    /// of each family plus per-candidate notes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Disabled`] when credentials are missing;
    /// individual candidate failures never error.
    pub async fn probe_endpoints(&self) -> Result<ProbeReport, RegistryError> {
        if !self.is_enabled() {
            return Err(RegistryError::Disabled);
        }

        let mut notes = Vec::new();
        let submit_url = self
            .probe_candidates(SUBMIT_CANDIDATES, "submit", &mut notes)
            .await;
        let status_url = self
            .probe_candidates(STATUS_CANDIDATES, "status", &mut notes)
            .await;
        Ok(ProbeReport {
            submit_url,
            status_url,
            notes,
        })
    }

    async fn probe_candidates(
        &self,
        candidates: &[&str],
        family: &str,
        notes: &mut Vec<String>,
    ) -> Option<String> {
        for suffix in candidates {
            let url = format!("{}/{suffix}", self.config().api_url_trimmed());
            let (verdict, note) = self.probe_one(&url).await;
            tracing::debug!(family, suffix, %note, "endpoint probe");
            notes.push(format!("{family} probe {suffix}: {note}"));
            if verdict.is_accepted() {
                return Some(url);
            }
        }
        None
    }

    /// POST the minimal body to one candidate and classify the response.
    async fn probe_one(&self, url: &str) -> (ProbeVerdict, String) {
        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config().api_key.clone())
            .text("data", "{}");

        let resp = match self.http().post(url).multipart(form).send().await {
            Ok(resp) => resp,
            Err(e) => return (ProbeVerdict::Rejected, format!("transport error: {e}")),
        };

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        let verdict = ProbeVerdict::from_response_parts(status, content_type.as_deref());
        let note = match content_type.as_deref() {
            _ if status == 404 || status == 405 => format!("HTTP {status} (no such endpoint)"),
            Some(ct) if ct.contains("json") => format!("HTTP {status} JSON"),
            Some(ct) if ct.contains("text/html") => format!("HTTP {status} HTML"),
            Some(ct) => format!("HTTP {status} ct={ct}"),
            None => format!("HTTP {status} ct=unknown"),
        };
        (verdict, note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_routes_are_rejected() {
        assert_eq!(
            ProbeVerdict::from_response_parts(404, Some("application/json")),
            ProbeVerdict::Rejected
        );
        assert_eq!(
            ProbeVerdict::from_response_parts(405, None),
            ProbeVerdict::Rejected
        );
    }

    #[test]
    fn structured_error_bodies_are_live_endpoints() {
        // A 400 with JSON means the route exists and parsed our (empty) payload.
        assert_eq!(
            ProbeVerdict::from_response_parts(400, Some("application/json")),
            ProbeVerdict::Accepted
        );
        assert_eq!(
            ProbeVerdict::from_response_parts(200, Some("application/json; charset=utf-8")),
            ProbeVerdict::Accepted
        );
    }

    #[test]
    fn html_pages_are_rejected() {
        assert_eq!(
            ProbeVerdict::from_response_parts(200, Some("text/html; charset=utf-8")),
            ProbeVerdict::Rejected
        );
    }

    #[test]
    fn unknown_content_accepted_conservatively() {
        assert_eq!(
            ProbeVerdict::from_response_parts(500, None),
            ProbeVerdict::Accepted
        );
        assert_eq!(
            ProbeVerdict::from_response_parts(200, Some("application/octet-stream")),
            ProbeVerdict::Accepted
        );
    }
}

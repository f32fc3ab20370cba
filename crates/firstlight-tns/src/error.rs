//! Registry error types.

use thiserror::Error;

/// Errors from registry and resolver interactions.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP transport error (connect failure, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A live endpoint rejected the payload (HTTP 400/422).
    ///
    /// Terminal for this submission attempt: the endpoint exists, so trying
    /// other candidate URLs would not help and could duplicate-submit.
    #[error("endpoint rejected payload (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Every candidate URL failed; carries the last recorded error.
    #[error("all candidate endpoints failed; last error: {last}")]
    Exhausted { last: String },

    /// Required bot credentials are missing; no network I/O was attempted.
    #[error("TNS client disabled (missing bot credentials)")]
    Disabled,
}

//! # firstlight-tns
//!
//! TNS registry HTTP client for Firstlight.
//!
//! The official endpoint shape is not reliably known in advance, so the
//! client discovers a working submission endpoint by probing an ordered
//! candidate list, then submits AT reports with fallback rotation and
//! strict response classification. Also hosts the Fink reverse-resolver
//! used by the remote dedup layer.

pub mod endpoints;
pub mod probe;
pub mod report;
pub mod resolver;
pub mod submit;

mod error;

pub use error::RegistryError;
pub use probe::{ProbeReport, ProbeVerdict};
pub use report::AtReport;
pub use resolver::{FinkResolver, ReverseResolver};
pub use submit::SubmitDisposition;

use firstlight_config::TnsConfig;
use std::time::Duration;

/// HTTP client for the TNS bulk-report API.
///
/// Credentials come in through the constructor; request code never reads
/// ambient environment state.
pub struct TnsClient {
    http: reqwest::Client,
    cfg: TnsConfig,
}

impl TnsClient {
    /// Create a client from explicit credentials.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(cfg: TnsConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(marker(&cfg))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client should build");
        Self { http, cfg }
    }

    /// Whether the required bot credentials are present.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.cfg.is_configured()
    }

    #[must_use]
    pub const fn config(&self) -> &TnsConfig {
        &self.cfg
    }

    /// The bot identity marker sent as the `User-Agent` header.
    #[must_use]
    pub fn marker(&self) -> String {
        marker(&self.cfg)
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Build the `tns_marker{...}` identity string TNS expects in `User-Agent`.
///
/// Field order is part of the wire convention, so the string is assembled
/// by hand rather than through a serialized map.
#[must_use]
pub fn marker(cfg: &TnsConfig) -> String {
    format!(
        "tns_marker{{\"tns_id\":{},\"type\":\"bot\",\"name\":\"{}\"}}",
        cfg.bot_id, cfg.bot_name
    )
}

/// Mask a secret for display, keeping the last four characters.
#[must_use]
pub fn mask(secret: &str) -> String {
    const KEEP: usize = 4;
    let len = secret.chars().count();
    if len <= KEEP {
        return "*".repeat(len);
    }
    let tail: String = secret.chars().skip(len - KEEP).collect();
    format!("{}{tail}", "*".repeat(len - KEEP))
}

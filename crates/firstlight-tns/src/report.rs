//! Minimal AT (astronomical transient) discovery report construction.
//!
//! TNS schemas vary slightly across versions; this is the conservative
//! minimal payload. If the registry rejects it for missing fields, the
//! response says which — add them here.

use firstlight_config::TnsConfig;
use firstlight_core::entities::NormalizedAlert;
use firstlight_core::time::jd_to_iso_utc;
use serde::{Deserialize, Serialize};

/// One AT report entry. Field order matches the wire payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtReport {
    pub objname: String,
    /// Right ascension in degrees, 7-decimal string form.
    pub ra: String,
    /// Declination in degrees, 7-decimal string form.
    pub dec: String,
    /// ISO-8601 UTC with trailing `Z`.
    pub discovery_datetime: String,
    pub reporting_group: String,
    pub reporter: String,
    pub reporter_email: String,
    pub instrument: String,
    pub mag: f64,
    pub filter: String,
}

impl AtReport {
    /// Build the minimal report for an accepted alert.
    ///
    /// Discovery time comes from the alert's JD; if that is unrepresentable,
    /// `fallback_utc` (typically "now") is used instead.
    #[must_use]
    pub fn from_alert(
        alert: &NormalizedAlert,
        cfg: &TnsConfig,
        observer: &str,
        fallback_utc: &str,
    ) -> Self {
        let reporting_group = if cfg.reporter_institution.is_empty() {
            "None".to_string()
        } else {
            cfg.reporter_institution.clone()
        };
        let reporter = if !cfg.reporter_name.is_empty() {
            cfg.reporter_name.clone()
        } else if !observer.is_empty() {
            observer.to_string()
        } else {
            "Unknown".to_string()
        };

        Self {
            objname: alert.object_id.clone(),
            ra: format_coord(alert.ra),
            dec: format_coord(alert.dec),
            discovery_datetime: jd_to_iso_utc(alert.jd)
                .unwrap_or_else(|| fallback_utc.to_string()),
            reporting_group,
            reporter,
            reporter_email: cfg.reporter_email.clone(),
            instrument: "ZTF".to_string(),
            mag: alert.mag,
            filter: filter_letter(alert.fid),
        }
    }

    /// Wrap the report in the bulk-report envelope `{"at_report":{"0":...}}`.
    #[must_use]
    pub fn envelope(&self) -> serde_json::Value {
        serde_json::json!({ "at_report": { "0": self } })
    }
}

/// Format a coordinate to exactly 7 decimal places, as a string.
///
/// String form avoids cross-platform float-formatting divergence in the
/// submitted payload.
#[must_use]
pub fn format_coord(deg: f64) -> String {
    format!("{deg:.7}")
}

/// Map a numeric band id to its filter letter; unmapped ids pass through
/// as their numeric string form.
#[must_use]
pub fn filter_letter(fid: i64) -> String {
    match fid {
        1 => "g".to_string(),
        2 => "r".to_string(),
        3 => "i".to_string(),
        other => other.to_string(),
    }
}

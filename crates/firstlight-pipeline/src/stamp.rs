//! Stamp-metrics collaborator seam.
//!
//! Decoding the gzipped FITS cutout bytes is an external concern. The
//! pipeline only defines the seam and the rule that a failed computation
//! means "metrics absent", never a dropped alert.

use firstlight_core::entities::StampMetrics;
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StampError {
    /// No decoder is wired in, or the alert carries no cutout.
    #[error("stamp unavailable: {0}")]
    Unavailable(String),

    /// The cutout bytes could not be decoded.
    #[error("stamp decode failed: {0}")]
    Decode(String),
}

/// Computes robust image statistics for the alert's science cutout.
///
/// Implementations receive the full raw alert record and are responsible
/// for locating and decoding the stamp bytes within it.
pub trait StampAnalyzer {
    /// # Errors
    ///
    /// Returns [`StampError`] when metrics cannot be computed; the caller
    /// treats this as "absent", not as a pipeline failure.
    fn metrics(&self, alert: &Value) -> Result<StampMetrics, StampError>;
}

/// Analyzer used when no stamp decoder is configured.
pub struct NullStampAnalyzer;

impl StampAnalyzer for NullStampAnalyzer {
    fn metrics(&self, _alert: &Value) -> Result<StampMetrics, StampError> {
        Err(StampError::Unavailable("no stamp decoder configured".into()))
    }
}

/// Merge stamp statistics into a decision metrics snapshot.
pub fn merge_into(metrics: &mut Map<String, Value>, stamp: &StampMetrics) {
    metrics.insert("stamp_med".into(), json!(stamp.median));
    metrics.insert("stamp_mad".into(), json!(stamp.mad));
    metrics.insert("stamp_peak".into(), json!(stamp.peak));
    metrics.insert("stamp_trough".into(), json!(stamp.trough));
    metrics.insert("stamp_snr_like".into(), json!(stamp.snr_like));
    metrics.insert(
        "stamp_shape".into(),
        json!([stamp.shape.0, stamp.shape.1]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_analyzer_reports_unavailable() {
        let err = NullStampAnalyzer.metrics(&Value::Null).unwrap_err();
        assert!(matches!(err, StampError::Unavailable(_)));
    }

    #[test]
    fn merge_adds_prefixed_keys() {
        let mut metrics = Map::new();
        merge_into(
            &mut metrics,
            &StampMetrics {
                median: 10.0,
                mad: 1.5,
                peak: 800.0,
                trough: -4.0,
                snr_like: 355.0,
                shape: (63, 63),
            },
        );
        assert_eq!(metrics["stamp_peak"], json!(800.0));
        assert_eq!(metrics["stamp_shape"], json!([63, 63]));
    }
}

//! N1 filter policy thresholds.
//!
//! Defaults are tuned to maximize early + new candidates with minimal junk
//! under a low-latency budget, not to be "best science".

use serde::{Deserialize, Serialize};

const fn default_drb_min() -> f64 {
    0.9
}

const fn default_rb_fallback_min() -> f64 {
    0.65
}

const fn default_require_positive_diff() -> bool {
    true
}

const fn default_min_ssdistnr_arcsec() -> f64 {
    20.0
}

const fn default_min_distpsnr1_arcsec() -> f64 {
    3.0
}

const fn default_min_ps1_mag() -> f64 {
    15.0
}

const fn default_max_nmtchps() -> i64 {
    5
}

const fn default_max_ndethist() -> i64 {
    3
}

const fn default_max_days_since_nondet() -> f64 {
    3.0
}

const fn default_min_delta_mag_from_nondet() -> f64 {
    1.5
}

/// Thresholds for the ordered N1 gate chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct N1Policy {
    /// Minimum deep-learning real/bogus score.
    #[serde(default = "default_drb_min")]
    pub drb_min: f64,

    /// Minimum classic real/bogus score, used only when `drb` is absent.
    #[serde(default = "default_rb_fallback_min")]
    pub rb_fallback_min: f64,

    /// Require a positive image-subtraction residual.
    #[serde(default = "default_require_positive_diff")]
    pub require_positive_diff: bool,

    /// Minimum distance to the nearest known solar-system object, arcsec.
    #[serde(default = "default_min_ssdistnr_arcsec")]
    pub min_ssdistnr_arcsec: f64,

    /// Minimum distance to the nearest PS1 catalog source, arcsec.
    #[serde(default = "default_min_distpsnr1_arcsec")]
    pub min_distpsnr1_arcsec: f64,

    /// Minimum r-band magnitude of the nearest PS1 source (fainter = larger).
    #[serde(default = "default_min_ps1_mag")]
    pub min_ps1_mag: f64,

    /// Maximum PS1 point-source match count.
    #[serde(default = "default_max_nmtchps")]
    pub max_nmtchps: i64,

    /// Maximum prior detection count.
    #[serde(default = "default_max_ndethist")]
    pub max_ndethist: i64,

    /// Maximum age of the most recent non-detection, days.
    #[serde(default = "default_max_days_since_nondet")]
    pub max_days_since_nondet: f64,

    /// Minimum brightening since that non-detection, magnitudes.
    #[serde(default = "default_min_delta_mag_from_nondet")]
    pub min_delta_mag_from_nondet: f64,
}

impl Default for N1Policy {
    fn default() -> Self {
        Self {
            drb_min: default_drb_min(),
            rb_fallback_min: default_rb_fallback_min(),
            require_positive_diff: default_require_positive_diff(),
            min_ssdistnr_arcsec: default_min_ssdistnr_arcsec(),
            min_distpsnr1_arcsec: default_min_distpsnr1_arcsec(),
            min_ps1_mag: default_min_ps1_mag(),
            max_nmtchps: default_max_nmtchps(),
            max_ndethist: default_max_ndethist(),
            max_days_since_nondet: default_max_days_since_nondet(),
            min_delta_mag_from_nondet: default_min_delta_mag_from_nondet(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let policy = N1Policy::default();
        assert!(policy.require_positive_diff);
        assert!(policy.drb_min > policy.rb_fallback_min);
        assert_eq!(policy.max_nmtchps, 5);
        assert_eq!(policy.max_ndethist, 3);
    }
}

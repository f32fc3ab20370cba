//! Entity structs for alerts, decisions, and registry actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, ActionOutcome, ReasonCode};

/// One canonical observation of a candidate transient.
///
/// Constructed once per raw alert by the normalizer and never mutated. The
/// `-999` sentinel on catalog distance/magnitude fields is carried through
/// verbatim; interpreting it as "no information" is the filter's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedAlert {
    /// Stable source identifier across observations (e.g. `ZTF21abcdef`).
    pub object_id: String,
    /// Unique identifier of this single observation.
    pub candid: String,
    /// Stream topic the alert arrived on.
    pub topic: String,
    pub ra: f64,
    pub dec: f64,
    /// Observation time as a Julian Date.
    pub jd: f64,
    /// Photometric band id (1=g, 2=r, 3=i for ZTF).
    pub fid: i64,
    pub mag: f64,
    pub magerr: f64,
    pub limmag: f64,
    /// Deep-learning real/bogus score (primary estimator).
    pub drb: Option<f64>,
    /// Classic real/bogus score (fallback estimator).
    pub rb: Option<f64>,
    /// Sign of the image-subtraction residual (`"t"`/`"1"` = positive).
    pub isdiffpos: Option<String>,
    /// Distance to nearest known solar-system object, arcsec.
    pub ssdistnr: Option<f64>,
    /// Distance to nearest PS1 catalog source, arcsec.
    pub distpsnr1: Option<f64>,
    /// Star/galaxy score of the nearest PS1 source.
    pub sgscore1: Option<f64>,
    /// r-band magnitude of the nearest PS1 source.
    pub srmag1: Option<f64>,
    /// Number of PS1 point-source matches near the candidate.
    pub nmtchps: Option<i64>,
    /// Number of prior detections in the survey history.
    pub ndethist: Option<i64>,
    /// Time of the most recent prior non-detection, if any.
    pub last_nondet_jd: Option<f64>,
    /// Limiting magnitude of that non-detection.
    pub last_nondet_lim: Option<f64>,
    /// `last_nondet_lim - mag`; present iff both operands are.
    pub delta_mag_from_nondet: Option<f64>,
    /// Original raw record, retained for audit.
    pub raw: serde_json::Value,
}

/// Outcome of one filter evaluation, written once to the audit store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub object_id: String,
    pub candid: String,
    pub topic: String,
    pub passed: bool,
    pub reason: ReasonCode,
    pub metrics: serde_json::Value,
    pub decided_at: DateTime<Utc>,
}

/// One step of the registry interaction, written once to the audit store.
///
/// The per-object sequence of these rows is the durable state machine that
/// makes submission exactly-once across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryAction {
    pub object_id: String,
    pub candid: String,
    pub kind: ActionKind,
    pub outcome: ActionOutcome,
    pub detail: String,
    pub at: DateTime<Utc>,
}

/// Cheap robust statistics over a difference-image stamp.
///
/// Produced by the stamp collaborator; the pipeline treats a failed
/// computation as "metrics absent" rather than an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StampMetrics {
    pub median: f64,
    /// Median absolute deviation.
    pub mad: f64,
    pub peak: f64,
    pub trough: f64,
    pub snr_like: f64,
    /// Image dimensions (rows, cols).
    pub shape: (u32, u32),
}

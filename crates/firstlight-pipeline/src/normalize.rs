//! Raw alert → canonical record.
//!
//! Pure function, no I/O. Sentinel domain values (−999) are carried through
//! verbatim; interpreting them is the gate chain's job.

use firstlight_core::entities::NormalizedAlert;
use serde_json::Value;
use thiserror::Error;

/// Normalization failure. The caller must skip-and-log, never retry the
/// same payload.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed alert: {0}")]
    MalformedAlert(String),
}

/// Build the canonical record from one raw alert.
///
/// The most recent non-detection is the `prv_candidates` entry with no
/// observation id and the maximum `jd` strictly before the current
/// observation's `jd`.
///
/// # Errors
///
/// Returns [`NormalizeError::MalformedAlert`] when the nested `candidate`
/// record, `objectId`, or any of `jd`/`ra`/`dec` is missing.
pub fn normalize(raw: &Value, topic: &str) -> Result<NormalizedAlert, NormalizeError> {
    let candidate = raw
        .get("candidate")
        .filter(|c| c.is_object())
        .ok_or_else(|| NormalizeError::MalformedAlert("missing 'candidate' record".into()))?;
    let object_id = raw
        .get("objectId")
        .and_then(Value::as_str)
        .ok_or_else(|| NormalizeError::MalformedAlert("missing 'objectId'".into()))?
        .to_string();

    let jd = require_f64(candidate, "jd")?;
    let ra = require_f64(candidate, "ra")?;
    let dec = require_f64(candidate, "dec")?;

    let prv = raw
        .get("prv_candidates")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let nondet = last_nondet(prv, jd);
    let last_nondet_jd = nondet.and_then(|p| opt_f64(p, "jd"));
    let last_nondet_lim = nondet.and_then(|p| opt_f64(p, "diffmaglim"));

    let mag = opt_f64(candidate, "magpsf");
    let delta_mag_from_nondet = match (last_nondet_lim, mag) {
        (Some(lim), Some(mag)) => Some(lim - mag),
        _ => None,
    };

    Ok(NormalizedAlert {
        object_id,
        candid: candid_string(candidate.get("candid")),
        topic: topic.to_string(),
        ra,
        dec,
        jd,
        fid: opt_i64(candidate, "fid").unwrap_or(0),
        mag: mag.unwrap_or(f64::NAN),
        magerr: opt_f64(candidate, "sigmapsf").unwrap_or(f64::NAN),
        limmag: opt_f64(candidate, "diffmaglim").unwrap_or(f64::NAN),
        drb: opt_f64(candidate, "drb"),
        rb: opt_f64(candidate, "rb"),
        isdiffpos: isdiffpos_string(candidate.get("isdiffpos")),
        ssdistnr: opt_f64(candidate, "ssdistnr"),
        distpsnr1: opt_f64(candidate, "distpsnr1"),
        sgscore1: opt_f64(candidate, "sgscore1"),
        srmag1: opt_f64(candidate, "srmag1"),
        nmtchps: opt_i64(candidate, "nmtchps"),
        ndethist: opt_i64(candidate, "ndethist"),
        last_nondet_jd,
        last_nondet_lim,
        delta_mag_from_nondet,
        raw: raw.clone(),
    })
}

/// Select the most recent prior non-detection: no `candid`, `jd` present
/// and strictly less than `current_jd`, maximum `jd` among those.
fn last_nondet(prv: &[Value], current_jd: f64) -> Option<&Value> {
    prv.iter()
        .filter(|p| {
            p.get("candid").is_none_or(Value::is_null)
                && opt_f64(p, "jd").is_some_and(|jd| jd < current_jd)
        })
        .max_by(|a, b| {
            let ja = opt_f64(a, "jd").unwrap_or(f64::NEG_INFINITY);
            let jb = opt_f64(b, "jd").unwrap_or(f64::NEG_INFINITY);
            ja.total_cmp(&jb)
        })
}

fn require_f64(candidate: &Value, key: &str) -> Result<f64, NormalizeError> {
    opt_f64(candidate, key)
        .ok_or_else(|| NormalizeError::MalformedAlert(format!("missing candidate '{key}'")))
}

fn opt_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn opt_i64(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(Value::as_i64)
}

/// Observation ids may arrive as numbers or strings; store the string form.
fn candid_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// The subtraction-sign flag may arrive as `"t"`, `"1"`, or a JSON bool.
fn isdiffpos_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Bool(b)) => Some(if *b { "t" } else { "f" }.to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

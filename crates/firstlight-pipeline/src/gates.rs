//! The ordered N1 gate chain.
//!
//! Gates run in fixed order with short-circuit evaluation: the first failing
//! gate determines the reason code and no further gates run. The ordering is
//! a contract — it decides which reason a borderline alert receives — so it
//! is pinned by tests and any reordering must be explicit.

use firstlight_config::N1Policy;
use firstlight_core::entities::NormalizedAlert;
use firstlight_core::enums::ReasonCode;
use serde_json::{Map, Value, json};

/// "Not computed" marker on catalog distance/magnitude fields.
///
/// Must be treated as "no information", never as a literal value.
pub const SENTINEL_NONE: f64 = -999.0;

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub passed: bool,
    pub reason: ReasonCode,
    pub metrics: Map<String, Value>,
}

/// A gate either passes or fails with the observed values that tripped it.
type GateCheck = fn(&NormalizedAlert, &N1Policy) -> Option<Map<String, Value>>;

pub struct Gate {
    pub name: &'static str,
    pub reason: ReasonCode,
    check: GateCheck,
}

/// The N1 chain, in contract order.
pub const GATES: &[Gate] = &[
    Gate {
        name: "real_bogus",
        reason: ReasonCode::RbFail,
        check: real_bogus,
    },
    Gate {
        name: "positive_diff",
        reason: ReasonCode::IsdiffposFail,
        check: positive_diff,
    },
    Gate {
        name: "sso_veto",
        reason: ReasonCode::SsoMatch,
        check: sso_veto,
    },
    Gate {
        name: "ps1_distance",
        reason: ReasonCode::Ps1TooClose,
        check: ps1_distance,
    },
    Gate {
        name: "ps1_brightness",
        reason: ReasonCode::Ps1TooBright,
        check: ps1_brightness,
    },
    Gate {
        name: "crowding",
        reason: ReasonCode::CrowdedField,
        check: crowding,
    },
    Gate {
        name: "novelty",
        reason: ReasonCode::TooManyDetections,
        check: novelty,
    },
    Gate {
        name: "recent_nondet",
        reason: ReasonCode::NoRecentNondet,
        check: recent_nondet,
    },
    Gate {
        name: "nondet_ordering",
        reason: ReasonCode::NondetInFuture,
        check: nondet_ordering,
    },
    Gate {
        name: "nondet_window",
        reason: ReasonCode::NondetTooOld,
        check: nondet_window,
    },
    Gate {
        name: "mag_jump",
        reason: ReasonCode::DeltaMagSmall,
        check: mag_jump,
    },
];

/// Run the chain. Returns on the first failing gate; a full pass carries
/// the complete metrics snapshot including `days_since_nondet`.
#[must_use]
pub fn evaluate(alert: &NormalizedAlert, policy: &N1Policy) -> Verdict {
    for gate in GATES {
        if let Some(observed) = (gate.check)(alert, policy) {
            return Verdict {
                passed: false,
                reason: gate.reason,
                metrics: observed,
            };
        }
    }
    Verdict {
        passed: true,
        reason: ReasonCode::Pass,
        metrics: pass_metrics(alert),
    }
}

#[allow(clippy::float_cmp)]
fn is_sentinel(value: f64) -> bool {
    value == SENTINEL_NONE
}

fn observed<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// Gate 1: primary score, or fallback score only when the primary is absent.
fn real_bogus(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    let drb_ok = a.drb.is_some_and(|drb| drb >= c.drb_min);
    let rb_ok = a.drb.is_none() && a.rb.is_some_and(|rb| rb >= c.rb_fallback_min);
    if drb_ok || rb_ok {
        None
    } else {
        Some(observed([("drb", json!(a.drb)), ("rb", json!(a.rb))]))
    }
}

// Gate 2: negative residuals are subtraction artifacts.
fn positive_diff(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    if !c.require_positive_diff {
        return None;
    }
    match a.isdiffpos.as_deref() {
        Some("t" | "1") => None,
        _ => Some(observed([("isdiffpos", json!(a.isdiffpos))])),
    }
}

// Gate 3: known solar-system object nearby.
fn sso_veto(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match a.ssdistnr {
        Some(d) if !is_sentinel(d) && d < c.min_ssdistnr_arcsec => {
            Some(observed([("ssdistnr", json!(d))]))
        }
        _ => None,
    }
}

// Gate 4: hostless heuristic — PS1 counterpart must be far.
fn ps1_distance(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match a.distpsnr1 {
        Some(d) if !is_sentinel(d) && d < c.min_distpsnr1_arcsec => {
            Some(observed([("distpsnr1", json!(d))]))
        }
        _ => None,
    }
}

// Gate 5: or faint — a bright close star means a stellar flare or artifact.
fn ps1_brightness(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match a.srmag1 {
        Some(m) if !is_sentinel(m) && m < c.min_ps1_mag => Some(observed([("srmag1", json!(m))])),
        _ => None,
    }
}

// Gate 6: crowded fields produce junk matches.
fn crowding(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match a.nmtchps {
        Some(n) if n > c.max_nmtchps => Some(observed([("nmtchps", json!(n))])),
        _ => None,
    }
}

// Gate 7: long detection history means it is not new.
fn novelty(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match a.ndethist {
        Some(n) if n > c.max_ndethist => Some(observed([("ndethist", json!(n))])),
        _ => None,
    }
}

// Gate 8: without a recent non-detection there is no rise constraint.
fn recent_nondet(a: &NormalizedAlert, _c: &N1Policy) -> Option<Map<String, Value>> {
    if a.last_nondet_jd.is_some()
        && a.last_nondet_lim.is_some()
        && a.delta_mag_from_nondet.is_some()
    {
        None
    } else {
        Some(observed([("last_nondet_jd", json!(a.last_nondet_jd))]))
    }
}

fn days_since_nondet(a: &NormalizedAlert) -> Option<f64> {
    a.last_nondet_jd.map(|jd| a.jd - jd)
}

// Gate 9: a non-detection after the observation is corrupt history.
fn nondet_ordering(a: &NormalizedAlert, _c: &N1Policy) -> Option<Map<String, Value>> {
    match days_since_nondet(a) {
        Some(days) if days < 0.0 => Some(observed([("days", json!(days))])),
        _ => None,
    }
}

// Gate 10: the non-detection must be recent enough to bound the rise time.
fn nondet_window(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match days_since_nondet(a) {
        Some(days) if days > c.max_days_since_nondet => Some(observed([("days", json!(days))])),
        _ => None,
    }
}

// Gate 11: the brightening since the non-detection must be significant.
fn mag_jump(a: &NormalizedAlert, c: &N1Policy) -> Option<Map<String, Value>> {
    match a.delta_mag_from_nondet {
        Some(delta) if delta < c.min_delta_mag_from_nondet => {
            Some(observed([("delta_mag", json!(delta))]))
        }
        _ => None,
    }
}

/// Snapshot of every value the chain used, recorded with passing decisions.
fn pass_metrics(a: &NormalizedAlert) -> Map<String, Value> {
    observed([
        ("object_id", json!(a.object_id)),
        ("candid", json!(a.candid)),
        ("topic", json!(a.topic)),
        ("jd", json!(a.jd)),
        ("mag", json!(a.mag)),
        ("limmag", json!(a.limmag)),
        ("delta_mag_from_nondet", json!(a.delta_mag_from_nondet)),
        ("days_since_nondet", json!(days_since_nondet(a))),
        ("drb", json!(a.drb)),
        ("rb", json!(a.rb)),
        ("distpsnr1", json!(a.distpsnr1)),
        ("srmag1", json!(a.srmag1)),
        ("nmtchps", json!(a.nmtchps)),
        ("ndethist", json!(a.ndethist)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// The §8 end-to-end scenario: every gate satisfied.
    fn passing_alert() -> NormalizedAlert {
        NormalizedAlert {
            object_id: "ZTF21abcdef".to_string(),
            candid: "1000".to_string(),
            topic: "ztf_hostless".to_string(),
            ra: 12.3,
            dec: -5.0,
            jd: 2_459_000.6,
            fid: 1,
            mag: 18.0,
            magerr: 0.07,
            limmag: 20.3,
            drb: Some(0.9),
            rb: None,
            isdiffpos: Some("t".to_string()),
            ssdistnr: None,
            distpsnr1: Some(-999.0),
            sgscore1: None,
            srmag1: Some(-999.0),
            nmtchps: Some(2),
            ndethist: Some(1),
            last_nondet_jd: Some(2_459_000.1),
            last_nondet_lim: Some(20.0),
            delta_mag_from_nondet: Some(2.0),
            raw: Value::Null,
        }
    }

    fn policy() -> N1Policy {
        N1Policy {
            drb_min: 0.8,
            rb_fallback_min: 0.65,
            require_positive_diff: true,
            min_ssdistnr_arcsec: 20.0,
            min_distpsnr1_arcsec: 3.0,
            min_ps1_mag: 15.0,
            max_nmtchps: 5,
            max_ndethist: 3,
            max_days_since_nondet: 3.0,
            min_delta_mag_from_nondet: 1.5,
        }
    }

    #[test]
    fn clean_alert_passes() {
        let verdict = evaluate(&passing_alert(), &policy());
        assert!(verdict.passed);
        assert_eq!(verdict.reason, ReasonCode::Pass);
        let days = verdict.metrics["days_since_nondet"].as_f64().unwrap();
        assert!((days - 0.5).abs() < 1e-6, "days_since_nondet = {days}");
        assert_eq!(verdict.metrics["delta_mag_from_nondet"], json!(2.0));
    }

    #[test]
    fn gate_order_is_pinned() {
        let reasons: Vec<ReasonCode> = GATES.iter().map(|g| g.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ReasonCode::RbFail,
                ReasonCode::IsdiffposFail,
                ReasonCode::SsoMatch,
                ReasonCode::Ps1TooClose,
                ReasonCode::Ps1TooBright,
                ReasonCode::CrowdedField,
                ReasonCode::TooManyDetections,
                ReasonCode::NoRecentNondet,
                ReasonCode::NondetInFuture,
                ReasonCode::NondetTooOld,
                ReasonCode::DeltaMagSmall,
            ]
        );
    }

    #[test]
    fn first_failing_gate_wins() {
        // Both the rb gate and the crowding gate would fail; rb is earlier.
        let alert = NormalizedAlert {
            drb: Some(0.1),
            nmtchps: Some(50),
            ..passing_alert()
        };
        let verdict = evaluate(&alert, &policy());
        assert_eq!(verdict.reason, ReasonCode::RbFail);
    }

    #[test]
    fn rb_fallback_only_when_primary_absent() {
        // Weak drb with a strong rb still fails: the fallback does not rescue.
        let alert = NormalizedAlert {
            drb: Some(0.5),
            rb: Some(0.99),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::RbFail);

        // Absent drb defers to rb.
        let alert = NormalizedAlert {
            drb: None,
            rb: Some(0.7),
            ..passing_alert()
        };
        assert!(evaluate(&alert, &policy()).passed);
    }

    #[rstest]
    #[case::sso(
        NormalizedAlert { ssdistnr: Some(-999.0), ..passing_alert() },
        true
    )]
    #[case::sso_real(
        NormalizedAlert { ssdistnr: Some(2.0), ..passing_alert() },
        false
    )]
    #[case::ps1_dist(
        NormalizedAlert { distpsnr1: Some(-999.0), ..passing_alert() },
        true
    )]
    #[case::ps1_mag(
        NormalizedAlert { srmag1: Some(-999.0), ..passing_alert() },
        true
    )]
    fn sentinel_never_vetoes(#[case] alert: NormalizedAlert, #[case] should_pass: bool) {
        assert_eq!(evaluate(&alert, &policy()).passed, should_pass);
    }

    #[test]
    fn veto_gates_fire_on_real_values() {
        let alert = NormalizedAlert {
            ssdistnr: Some(5.0),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::SsoMatch);

        let alert = NormalizedAlert {
            distpsnr1: Some(0.4),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::Ps1TooClose);

        let alert = NormalizedAlert {
            srmag1: Some(12.0),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::Ps1TooBright);
    }

    #[test]
    fn thresholds_are_inclusive() {
        // Exactly at the threshold passes on every inclusive comparison.
        let alert = NormalizedAlert {
            drb: Some(0.8),
            ssdistnr: Some(20.0),
            distpsnr1: Some(3.0),
            srmag1: Some(15.0),
            nmtchps: Some(5),
            ndethist: Some(3),
            delta_mag_from_nondet: Some(1.5),
            ..passing_alert()
        };
        assert!(evaluate(&alert, &policy()).passed);
    }

    #[test]
    fn nondet_gates_in_order() {
        let alert = NormalizedAlert {
            last_nondet_jd: None,
            last_nondet_lim: None,
            delta_mag_from_nondet: None,
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::NoRecentNondet);

        // Non-detection "after" the observation.
        let alert = NormalizedAlert {
            last_nondet_jd: Some(2_459_001.0),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::NondetInFuture);

        let alert = NormalizedAlert {
            last_nondet_jd: Some(2_458_990.0),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::NondetTooOld);

        let alert = NormalizedAlert {
            delta_mag_from_nondet: Some(0.3),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::DeltaMagSmall);
    }

    #[test]
    fn crowding_and_history_limits() {
        let alert = NormalizedAlert {
            nmtchps: Some(6),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::CrowdedField);

        let alert = NormalizedAlert {
            ndethist: Some(4),
            ..passing_alert()
        };
        assert_eq!(
            evaluate(&alert, &policy()).reason,
            ReasonCode::TooManyDetections
        );
    }

    #[test]
    fn positive_diff_gate_honors_toggle() {
        let alert = NormalizedAlert {
            isdiffpos: Some("f".to_string()),
            ..passing_alert()
        };
        assert_eq!(evaluate(&alert, &policy()).reason, ReasonCode::IsdiffposFail);

        let relaxed = N1Policy {
            require_positive_diff: false,
            ..policy()
        };
        assert!(evaluate(&alert, &relaxed).passed);
    }

    #[test]
    fn failing_verdict_reports_observed_values() {
        let alert = NormalizedAlert {
            nmtchps: Some(42),
            ..passing_alert()
        };
        let verdict = evaluate(&alert, &policy());
        assert_eq!(verdict.metrics["nmtchps"], json!(42));
    }
}

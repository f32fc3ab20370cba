//! Reason codes, registry action enums, and the dedup policy.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all =
//! "snake_case")]`, matching the string form stored in SQL and emitted in
//! logs.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ReasonCode
// ---------------------------------------------------------------------------

/// Why a decision accepted or rejected an alert.
///
/// Each rejection variant corresponds to exactly one gate in the N1 chain;
/// the first failing gate determines the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Pass,
    RbFail,
    IsdiffposFail,
    SsoMatch,
    Ps1TooClose,
    Ps1TooBright,
    CrowdedField,
    TooManyDetections,
    NoRecentNondet,
    NondetInFuture,
    NondetTooOld,
    DeltaMagSmall,
}

impl ReasonCode {
    /// String representation used in SQL storage and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::RbFail => "rb_fail",
            Self::IsdiffposFail => "isdiffpos_fail",
            Self::SsoMatch => "sso_match",
            Self::Ps1TooClose => "ps1_too_close",
            Self::Ps1TooBright => "ps1_too_bright",
            Self::CrowdedField => "crowded_field",
            Self::TooManyDetections => "too_many_detections",
            Self::NoRecentNondet => "no_recent_nondet",
            Self::NondetInFuture => "nondet_in_future",
            Self::NondetTooOld => "nondet_too_old",
            Self::DeltaMagSmall => "delta_mag_small",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionKind / ActionOutcome
// ---------------------------------------------------------------------------

/// Kind of registry action recorded in the audit store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Check,
    Submit,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a registry action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Skip,
    Ok,
    Error,
}

impl ActionOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DedupPolicy
// ---------------------------------------------------------------------------

/// How the remote dedup layer treats resolver transport/parse failures.
///
/// `FailOpen` accepts "no response" as "no match" (availability over
/// missed-duplicate risk); `FailClosed` skips submission instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    #[default]
    FailOpen,
    FailClosed,
}

impl DedupPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailOpen => "fail_open",
            Self::FailClosed => "fail_closed",
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reason_codes_serialize_snake_case() {
        let json = serde_json::to_string(&ReasonCode::Ps1TooBright).unwrap();
        assert_eq!(json, "\"ps1_too_bright\"");
        let back: ReasonCode = serde_json::from_str("\"nondet_too_old\"").unwrap();
        assert_eq!(back, ReasonCode::NondetTooOld);
    }

    #[test]
    fn as_str_matches_serde_form() {
        for code in [
            ReasonCode::Pass,
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
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn action_enums_round_trip() {
        assert_eq!(ActionKind::Submit.as_str(), "submit");
        assert_eq!(ActionOutcome::Skip.as_str(), "skip");
        let kind: ActionKind = serde_json::from_str("\"check\"").unwrap();
        assert_eq!(kind, ActionKind::Check);
    }

    #[test]
    fn dedup_policy_defaults_open() {
        assert_eq!(DedupPolicy::default(), DedupPolicy::FailOpen);
    }
}

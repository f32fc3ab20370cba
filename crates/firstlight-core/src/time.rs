//! Julian Date ↔ UTC conversion.
//!
//! No leap-second handling; alert timestamps do not need it.

use chrono::{DateTime, SecondsFormat, Utc};

/// Julian Date at the Unix epoch, 1970-01-01 00:00:00 UTC.
pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Convert a Julian Date to `DateTime<Utc>`.
///
/// Returns `None` for values outside chrono's representable range.
#[must_use]
pub fn jd_to_datetime(jd: f64) -> Option<DateTime<Utc>> {
    let unix_secs = (jd - JD_UNIX_EPOCH) * 86_400.0;
    #[allow(clippy::cast_possible_truncation)]
    let micros = (unix_secs * 1_000_000.0) as i64;
    DateTime::from_timestamp_micros(micros)
}

/// Convert a Julian Date to an ISO-8601 UTC string with trailing `Z`.
///
/// Returns `None` for unrepresentable values.
#[must_use]
pub fn jd_to_iso_utc(jd: f64) -> Option<String> {
    jd_to_datetime(jd).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unix_epoch_round_trips() {
        let dt = jd_to_datetime(JD_UNIX_EPOCH).unwrap();
        assert_eq!(dt.timestamp(), 0);
    }

    #[test]
    fn known_jd_converts() {
        // JD 2459000.5 is 2020-05-31 00:00:00 UTC.
        let iso = jd_to_iso_utc(2_459_000.5).unwrap();
        assert_eq!(iso, "2020-05-31T00:00:00.000Z");
    }

    #[test]
    fn iso_form_carries_trailing_z() {
        let iso = jd_to_iso_utc(2_459_000.75).unwrap();
        assert!(iso.ends_with('Z'), "expected trailing Z: {iso}");
        assert!(iso.starts_with("2020-05-31T06:00:00"), "got {iso}");
    }
}

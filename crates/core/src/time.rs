//! Timestamp helpers shared by the store, cache and gateway crates.

use chrono::{DateTime, Utc};

/// ISO-8601 UTC with a trailing `Z`, e.g. `2025-11-04T15:07:00Z`.
pub fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Human-readable rendering used in chat responses, e.g.
/// `"November 04, 2025 at 03:07 PM UTC"`.
pub fn formatted(ts: DateTime<Utc>) -> String {
    ts.format("%B %d, %Y at %I:%M %p UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso8601_has_trailing_z() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 4, 15, 7, 0).unwrap();
        assert_eq!(iso8601(ts), "2025-11-04T15:07:00Z");
    }

    #[test]
    fn formatted_matches_expected_style() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 4, 15, 7, 0).unwrap();
        assert_eq!(formatted(ts), "November 04, 2025 at 03:07 PM UTC");
    }
}

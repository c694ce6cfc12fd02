//! Timestamp parsing.
//!
//! Ingestion delivers timestamps as text in one of two layouts. Parsing is
//! explicit and fallible: on failure the caller skips only the
//! time-dependent rule or window append, never the whole request.

use crate::error::{FinGuardError, Result};
use chrono::NaiveDateTime;

/// Accepted timestamp layouts, in match order.
const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a transaction timestamp.
///
/// # Errors
///
/// Returns [`FinGuardError::InvalidTimestamp`] when the input matches
/// neither accepted layout.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(ts);
        }
    }
    Err(FinGuardError::invalid_timestamp(raw))
}

/// Parse an optional timestamp, treating absence like a parse failure.
#[must_use]
pub fn parse_opt(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.and_then(|r| parse_timestamp(r).ok())
}

/// Current wall-clock time, used only where no transaction timestamp is
/// available (e.g. feedback on a transaction with a malformed timestamp).
#[must_use]
pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_space_separated() {
        let ts = parse_timestamp("2026-02-22 10:05:30").expect("space layout");
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 5);
    }

    #[test]
    fn test_parse_iso_t_separated() {
        let ts = parse_timestamp("2026-02-22T10:05:30").expect("ISO layout");
        assert_eq!(ts.second(), 30);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("2026-02-22").is_err());
    }

    #[test]
    fn test_parse_opt() {
        assert!(parse_opt(Some("2026-02-22 10:00:00")).is_some());
        assert!(parse_opt(Some("bogus")).is_none());
        assert!(parse_opt(None).is_none());
    }
}

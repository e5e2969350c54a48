use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

/// Current instant as an RFC 3339 UTC timestamp, used in report envelopes.
pub fn rfc3339_utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whether `value` parses under the given strftime `format`. Tries zoned,
/// date-time, date-only, and time-only interpretations in turn.
pub fn matches_strftime(value: &str, format: &str) -> bool {
    DateTime::parse_from_str(value, format).is_ok()
        || NaiveDateTime::parse_from_str(value, format).is_ok()
        || NaiveDate::parse_from_str(value, format).is_ok()
        || NaiveTime::parse_from_str(value, format).is_ok()
}

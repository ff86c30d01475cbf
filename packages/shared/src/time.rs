use chrono::{DateTime, SecondsFormat, Utc};

/// Current Unix timestamp in milliseconds (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current Unix timestamp in seconds (UTC).
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Format a millisecond Unix timestamp as RFC 3339 (UTC).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

use chrono::{DateTime, NaiveDateTime};

pub use web_time::Instant as AppInstant;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const STANDARD_TIME_FORMAT: &str = "%H:%M:%S";
    pub const AXIS_TIME_FORMAT: &str = "%m-%d %H:%M";

    /// Accepted layouts for naive (zone-less) timestamps. Read as UTC.
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
}

/// Parse an ISO-like timestamp string into epoch milliseconds.
/// Strings carrying an offset (`Z`, `+01:00`) are honoured; naive strings are UTC.
pub fn iso_to_epoch_ms(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    TimeUtils::NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Epoch milliseconds to epoch seconds, truncating toward zero.
#[inline]
pub fn epoch_ms_to_sec(epoch_ms: i64) -> i64 {
    epoch_ms / TimeUtils::MS_IN_S
}

pub fn epoch_sec_to_time_string(epoch_sec: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp(epoch_sec, 0) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => format!("t={}", epoch_sec),
    }
}

pub fn epoch_sec_to_axis_label(epoch_sec: i64) -> String {
    match DateTime::from_timestamp(epoch_sec, 0) {
        Some(dt) => dt.format(TimeUtils::AXIS_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_with_zone_and_naive_agree_for_utc() {
        let zoned = iso_to_epoch_ms("2024-03-01T10:15:00Z").unwrap();
        let naive = iso_to_epoch_ms("2024-03-01T10:15:00").unwrap();
        let spaced = iso_to_epoch_ms("2024-03-01 10:15:00").unwrap();
        assert_eq!(zoned, naive);
        assert_eq!(zoned, spaced);
        assert_eq!(zoned, 1_709_288_100_000);
    }

    #[test]
    fn offset_is_applied() {
        let utc = iso_to_epoch_ms("2024-03-01T10:15:00Z").unwrap();
        let plus_one = iso_to_epoch_ms("2024-03-01T11:15:00+01:00").unwrap();
        assert_eq!(utc, plus_one);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(iso_to_epoch_ms("yesterday"), None);
        assert_eq!(iso_to_epoch_ms(""), None);
    }

    #[test]
    fn ms_to_sec_truncates_toward_zero() {
        assert_eq!(epoch_ms_to_sec(1_999), 1);
        assert_eq!(epoch_ms_to_sec(-1_999), -1);
    }

    #[test]
    fn time_string_formats_utc() {
        assert_eq!(epoch_sec_to_time_string(1_709_288_100), "10:15:00");
    }
}

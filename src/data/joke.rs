use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single joke request.
///
/// Exactly one of `text` or `error` is meaningful: on success `text` is the
/// joke and `error` is `None`, on failure `text` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeResult {
    pub text: String,
    pub error: Option<String>,
}

impl JokeResult {
    pub fn joke(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A joke as stored by the backend history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeRecord {
    pub id: i64,
    pub joke_text: String,
    /// ISO-8601 timestamp, as sent by the backend.
    pub created_at: String,
}

impl JokeRecord {
    pub fn display_timestamp(&self) -> String {
        format_timestamp(&self.created_at)
    }
}

/// Parses an ISO-8601 timestamp. Timestamps without an offset are read as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp as `YYYY.MM.DD | HH:MM:SS` (UTC).
pub fn format_timestamp(value: &str) -> String {
    match parse_timestamp(value) {
        Some(date) => date.format("%Y.%m.%d | %H:%M:%S").to_string(),
        None => {
            log::warn!("[history] Could not parse timestamp: {}", value);
            "INVALID.DATE.FORMAT".to_string()
        }
    }
}

/// Formats how long ago `value` was, relative to `now`.
pub fn format_relative_time(value: &str, now: DateTime<Utc>) -> String {
    let Some(date) = parse_timestamp(value) else {
        return "UNKNOWN.TIME.AGO".to_string();
    };

    let seconds = (now - date).num_seconds().max(0);
    if seconds < 60 {
        return format!("{} seconds ago", seconds);
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} {} ago", minutes, plural(minutes, "minute"));
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} {} ago", hours, plural(hours, "hour"));
    }

    let days = hours / 24;
    format!("{} {} ago", days, plural(days, "day"))
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_joke_result_shapes() {
        let ok = JokeResult::joke("Why did the scarecrow win? He was outstanding in his field.");
        assert!(ok.is_ok());
        assert!(ok.error.is_none());

        let failed = JokeResult::failure("no joke was returned");
        assert!(!failed.is_ok());
        assert!(failed.text.is_empty());
    }

    #[test]
    fn test_record_deserializes_backend_shape() {
        let records: Vec<JokeRecord> = serde_json::from_str(
            r#"[{"id":7,"joke_text":"I'm reading a book on anti-gravity.","created_at":"2024-03-05T14:07:09Z"}]"#,
        )
        .unwrap();
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].display_timestamp(), "2024.03.05 | 14:07:09");
    }

    #[test]
    fn test_format_timestamp_variants() {
        assert_eq!(
            format_timestamp("2024-03-05T14:07:09.123456"),
            "2024.03.05 | 14:07:09"
        );
        assert_eq!(
            format_timestamp("2024-03-05 14:07:09"),
            "2024.03.05 | 14:07:09"
        );
        assert_eq!(
            format_timestamp("2024-03-05T16:07:09+02:00"),
            "2024.03.05 | 14:07:09"
        );
        assert_eq!(format_timestamp("yesterday"), "INVALID.DATE.FORMAT");
    }

    #[test]
    fn test_format_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();

        assert_eq!(
            format_relative_time("2024-03-05T11:59:30Z", now),
            "30 seconds ago"
        );
        assert_eq!(
            format_relative_time("2024-03-05T11:59:00Z", now),
            "1 minute ago"
        );
        assert_eq!(
            format_relative_time("2024-03-05T10:00:00Z", now),
            "2 hours ago"
        );
        assert_eq!(
            format_relative_time("2024-03-02T12:00:00Z", now),
            "3 days ago"
        );
        assert_eq!(format_relative_time("garbage", now), "UNKNOWN.TIME.AGO");
    }
}

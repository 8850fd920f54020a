//! Due-time parsing and formatting.
//!
//! User input is accepted either as RFC 3339 or as a local wall-clock value in
//! the shape an HTML `datetime-local` field produces (`2026-10-18T09:30`).
//! Stored instants are always UTC.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};

use crate::error::{NudgeError, Result};

/// Local wall-clock layouts accepted after RFC 3339 fails.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a due time typed by the user.
pub fn parse_due_time(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NudgeError::InvalidTime {
            input: input.to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            // A wall-clock time skipped by a DST jump has no mapping; an
            // ambiguous one resolves to the first occurrence.
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| NudgeError::InvalidTime {
                    input: input.to_string(),
                });
        }
    }

    Err(NudgeError::InvalidTime {
        input: input.to_string(),
    })
}

/// The early reminder instant, `lead` before `due`.
///
/// Saturates at the earliest representable instant, so due times loaded from
/// storage near the lower bound of the calendar never overflow.
pub fn early_instant(due: DateTime<Utc>, lead: Duration) -> DateTime<Utc> {
    due.checked_sub_signed(lead).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Render an instant in the local time zone for list display.
pub fn display_local(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Serde adapter for stored due times.
///
/// Writes RFC 3339 with millisecond precision. Reads either an RFC 3339 string
/// or a number of epoch milliseconds, since older lists stored both shapes.
pub mod serde_instant {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| de::Error::custom(format!("invalid time {text:?}: {e}"))),
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| de::Error::custom(format!("epoch millis out of range: {ms}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Task, TaskId};

    #[test]
    fn parses_rfc3339_with_offset() {
        let t = parse_due_time("2026-10-18T09:30:00+02:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2026, 10, 18, 7, 30, 0).unwrap());
    }

    #[test]
    fn parses_datetime_local_shape() {
        let t = parse_due_time("2026-10-18T09:30").unwrap();
        let expected = Local
            .with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(t, expected);
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(
            parse_due_time("   "),
            Err(NudgeError::InvalidTime { .. })
        ));
        assert!(matches!(
            parse_due_time("tomorrow-ish"),
            Err(NudgeError::InvalidTime { .. })
        ));
        assert!(parse_due_time("2026-13-40T25:00").is_err());
    }

    #[test]
    fn early_instant_is_lead_before_due() {
        let due = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        assert_eq!(
            early_instant(due, Duration::minutes(5)),
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 25, 0).unwrap()
        );
    }

    #[test]
    fn early_instant_saturates_at_calendar_start() {
        let due = DateTime::<Utc>::MIN_UTC;
        assert_eq!(early_instant(due, Duration::minutes(5)), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn stored_time_accepts_string_or_millis() {
        let from_text: Task =
            serde_json::from_str(r#"{"id":1,"title":"a","time":"2026-10-18T07:30:00.000Z"}"#)
                .unwrap();
        let from_millis: Task = serde_json::from_str(&format!(
            r#"{{"id":1,"title":"a","time":{}}}"#,
            from_text.time.timestamp_millis()
        ))
        .unwrap();
        assert_eq!(from_text, from_millis);
        assert_eq!(from_text.id, TaskId(1));
    }

    #[test]
    fn stored_time_rejects_unparseable_text() {
        let res: std::result::Result<Task, _> =
            serde_json::from_str(r#"{"id":1,"title":"a","time":"Invalid Date"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn stored_time_writes_utc_millis() {
        let task = Task::new(
            TaskId(7),
            "write report",
            Utc.with_ymd_and_hms(2026, 10, 18, 7, 30, 0).unwrap(),
        );
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"title":"write report","time":"2026-10-18T07:30:00.000Z"}"#
        );
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// Identifier of a task: the creation timestamp in epoch milliseconds.
///
/// Serialised as a bare number to stay compatible with the stored list format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Allocate the id for a task created at `now`.
    ///
    /// Ids are strictly increasing: two tasks created in the same millisecond
    /// (or after the wall clock stepped backwards) get `last + 1`. When
    /// `last` is already `i64::MAX` the creation millis are used instead.
    pub fn allocate(now: DateTime<Utc>, last: Option<TaskId>) -> Self {
        let candidate = now.timestamp_millis();
        match last {
            Some(TaskId(prev)) if candidate <= prev => {
                Self(prev.checked_add(1).unwrap_or(candidate))
            }
            _ => Self(candidate),
        }
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// A to-do item with a due time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Absolute due instant. Reminders fire at `time - lead` and at `time`.
    #[serde(with = "crate::time::serde_instant")]
    pub time: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            time,
        }
    }
}

/// Source of "now". Injected everywhere a decision depends on the wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests and dry runs.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn allocate_uses_creation_millis() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let id = TaskId::allocate(now, None);
        assert_eq!(id.as_i64(), now.timestamp_millis());
    }

    #[test]
    fn allocate_never_repeats_within_same_millisecond() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let first = TaskId::allocate(now, None);
        let second = TaskId::allocate(now, Some(first));
        assert!(second > first);
        assert_eq!(second.as_i64(), first.as_i64() + 1);
    }

    #[test]
    fn allocate_after_max_id_does_not_overflow() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let id = TaskId::allocate(now, Some(TaskId(i64::MAX)));
        assert_eq!(id, TaskId(now.timestamp_millis()));
    }

    #[test]
    fn task_id_serialises_as_number() {
        let json = serde_json::to_string(&TaskId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn task_id_parses_from_cli_text() {
        assert_eq!(" 1700000000000 ".parse::<TaskId>().unwrap(), TaskId(1_700_000_000_000));
        assert!("abc".parse::<TaskId>().is_err());
    }

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), start + Duration::minutes(5));
    }
}

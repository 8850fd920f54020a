use chrono::{DateTime, Duration, Utc};
use nudge_core::TaskId;
use serde::{Deserialize, Serialize};

/// The two reminder instants derived from a task's due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// `lead` before the due time.
    Early,
    /// At the due time.
    Exact,
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReminderKind::Early => "early",
            ReminderKind::Exact => "exact",
        };
        write!(f, "{s}")
    }
}

/// What the scheduler decided for one reminder instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDecision {
    /// Still in the future: a timer fires after `delay`.
    Arm { at: DateTime<Utc>, delay: Duration },
    /// Early instant already passed while the due time has not; nothing armed.
    Skipped { at: DateTime<Utc> },
    /// The instant is not in the future.
    Elapsed { at: DateTime<Utc> },
}

impl SlotDecision {
    pub fn is_armed(&self) -> bool {
        matches!(self, SlotDecision::Arm { .. })
    }

    pub fn delay(&self) -> Option<Duration> {
        match self {
            SlotDecision::Arm { delay, .. } => Some(*delay),
            _ => None,
        }
    }
}

/// Decisions for both instants of one task, evaluated once against "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPlan {
    pub early: SlotDecision,
    pub exact: SlotDecision,
}

impl ReminderPlan {
    pub fn decisions(&self) -> [(ReminderKind, SlotDecision); 2] {
        [
            (ReminderKind::Early, self.early),
            (ReminderKind::Exact, self.exact),
        ]
    }

    pub fn armed_count(&self) -> usize {
        self.decisions().iter().filter(|(_, d)| d.is_armed()).count()
    }

    /// Number of instants that were asked for but are already in the past.
    pub fn elapsed_count(&self) -> usize {
        self.decisions()
            .iter()
            .filter(|(_, d)| matches!(d, SlotDecision::Elapsed { .. }))
            .count()
    }
}

/// A timer that is armed and has not fired yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedReminder {
    pub task_id: TaskId,
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
}

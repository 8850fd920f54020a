use chrono::{DateTime, Duration, Utc};
use nudge_core::time::early_instant;
use tracing::info;

use crate::types::{ReminderKind, ReminderPlan, SlotDecision};

/// Decide, once and relative to `now`, which reminder instants of a task get a timer.
///
/// The two instants are judged independently:
/// - early (`due - lead`) is armed when still in the future; when it has
///   passed but the due time has not, it is skipped without complaint;
///   otherwise it is elapsed.
/// - exact (`due`) is armed when still in the future, otherwise elapsed.
pub fn plan_reminders(due: DateTime<Utc>, lead: Duration, now: DateTime<Utc>) -> ReminderPlan {
    let early_at = early_instant(due, lead);
    let early_delay = early_at - now;
    let exact_delay = due - now;

    let early = if early_delay > Duration::zero() {
        SlotDecision::Arm {
            at: early_at,
            delay: early_delay,
        }
    } else if exact_delay > Duration::zero() {
        info!(
            at = %early_at,
            "early reminder already passed; only the due-time reminder will be set"
        );
        SlotDecision::Skipped { at: early_at }
    } else {
        SlotDecision::Elapsed { at: early_at }
    };

    let exact = if exact_delay > Duration::zero() {
        SlotDecision::Arm {
            at: due,
            delay: exact_delay,
        }
    } else {
        SlotDecision::Elapsed { at: due }
    };

    ReminderPlan { early, exact }
}

/// Reminder instants of a task that lie strictly before `now`, early first.
///
/// Used by the startup catch-up pass: each returned instant fires a trigger pair.
pub fn elapsed_instants(due: DateTime<Utc>, lead: Duration, now: DateTime<Utc>) -> Vec<ReminderKind> {
    let mut kinds = Vec::with_capacity(2);
    if early_instant(due, lead) < now {
        kinds.push(ReminderKind::Early);
    }
    if due < now {
        kinds.push(ReminderKind::Exact);
    }
    kinds
}

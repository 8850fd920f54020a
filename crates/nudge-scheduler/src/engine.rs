use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use nudge_core::{Task, TaskId};
use nudge_triggers::TriggerDispatcher;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::{
    schedule::{elapsed_instants, plan_reminders},
    types::{ArmedReminder, ReminderKind, ReminderPlan, SlotDecision},
};

struct ArmedTimer {
    kind: ReminderKind,
    fire_at: DateTime<Utc>,
    handle: AbortHandle,
}

/// Timers of one task. The title is shared with the timers so a fire after
/// an edit shows the current title.
struct TaskTimers {
    title: Arc<RwLock<String>>,
    timers: Vec<ArmedTimer>,
}

/// Arms one-shot reminder timers and keeps their handles per task.
///
/// Each armed instant is a spawned Tokio task that sleeps until the instant
/// and fires the alarm + notification pair through the shared dispatcher.
/// Must be used from within a Tokio runtime when arming.
pub struct ReminderScheduler {
    dispatcher: Arc<TriggerDispatcher>,
    lead: Duration,
    tasks: HashMap<TaskId, TaskTimers>,
}

impl ReminderScheduler {
    pub fn new(dispatcher: Arc<TriggerDispatcher>, lead: Duration) -> Self {
        Self {
            dispatcher,
            lead,
            tasks: HashMap::new(),
        }
    }

    /// Plan both reminder instants of `task` against `now` and arm a timer
    /// for every instant still in the future.
    pub fn schedule(&mut self, task: &Task, now: DateTime<Utc>) -> ReminderPlan {
        let plan = plan_reminders(task.time, self.lead, now);
        for (kind, decision) in plan.decisions() {
            if let SlotDecision::Arm { at, delay } = decision {
                self.arm(task, kind, at, delay);
            }
        }
        plan
    }

    /// Fire a trigger pair for every reminder instant of `task` already in
    /// the past. Never arms anything.
    pub fn catch_up(&self, task: &Task, now: DateTime<Utc>) -> Vec<ReminderKind> {
        let kinds = elapsed_instants(task.time, self.lead, now);
        for kind in &kinds {
            info!(task_id = %task.id, %kind, "firing overdue reminder");
            self.dispatcher.fire_pair(&task.title, task.time);
        }
        kinds
    }

    /// Abort every outstanding timer of a task. Returns how many were still pending.
    pub fn cancel(&mut self, task_id: TaskId) -> usize {
        let Some(entry) = self.tasks.remove(&task_id) else {
            return 0;
        };
        let pending = entry
            .timers
            .iter()
            .filter(|t| !t.handle.is_finished())
            .count();
        for timer in &entry.timers {
            timer.handle.abort();
        }
        if pending > 0 {
            info!(%task_id, pending, "reminder timers cancelled");
        }
        pending
    }

    /// Point outstanding timers of a task at its new title.
    pub fn retitle(&self, task_id: TaskId, title: &str) {
        if let Some(entry) = self.tasks.get(&task_id) {
            *entry.title.write().expect("title lock poisoned") = title.to_string();
        }
    }

    /// Timers of `task_id` that have not fired yet, earliest first.
    pub fn armed(&self, task_id: TaskId) -> Vec<ArmedReminder> {
        let mut armed: Vec<ArmedReminder> = self
            .tasks
            .get(&task_id)
            .map(|entry| {
                entry
                    .timers
                    .iter()
                    .filter(|t| !t.handle.is_finished())
                    .map(|t| ArmedReminder {
                        task_id,
                        kind: t.kind,
                        fire_at: t.fire_at,
                    })
                    .collect()
            })
            .unwrap_or_default();
        armed.sort_by_key(|r| r.fire_at);
        armed
    }

    /// Total timers across all tasks that have not fired yet.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .values()
            .flat_map(|entry| entry.timers.iter())
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    fn arm(&mut self, task: &Task, kind: ReminderKind, at: DateTime<Utc>, delay: Duration) {
        let entry = self.tasks.entry(task.id).or_insert_with(|| TaskTimers {
            title: Arc::new(RwLock::new(task.title.clone())),
            timers: Vec::new(),
        });
        // Drop handles of timers that already fired.
        entry.timers.retain(|t| !t.handle.is_finished());

        let dispatcher = Arc::clone(&self.dispatcher);
        let title = Arc::clone(&entry.title);
        let task_id = task.id;
        let due = task.time;
        let sleep_for = delay.to_std().unwrap_or_default();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(sleep_for).await;
            let title = title.read().expect("title lock poisoned").clone();
            info!(%task_id, %kind, "reminder fired");
            dispatcher.fire_pair(&title, due);
        })
        .abort_handle();

        debug!(%task_id, %kind, fire_at = %at, delay_secs = delay.num_seconds(), "reminder armed");
        entry.timers.push(ArmedTimer {
            kind,
            fire_at: at,
            handle,
        });
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for entry in self.tasks.values() {
            for timer in &entry.timers {
                timer.handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nudge_triggers::{
        AlarmPlayer, AudioResource, Notification, NotificationPermission, NotificationSink,
        PermissionPort,
    };
    use std::sync::Mutex;

    struct Granted;

    impl PermissionPort for Granted {
        fn state(&self) -> NotificationPermission {
            NotificationPermission::Granted
        }
        fn request(&self) -> NotificationPermission {
            NotificationPermission::Granted
        }
    }

    #[derive(Default)]
    struct Sink(Mutex<Vec<String>>);

    impl NotificationSink for Sink {
        fn show(&self, n: &Notification) -> nudge_triggers::Result<()> {
            self.0.lock().unwrap().push(n.body.clone());
            Ok(())
        }
    }

    struct Silent;

    impl AlarmPlayer for Silent {
        fn play(&self, _: &AudioResource) -> nudge_triggers::Result<()> {
            Ok(())
        }
    }

    fn scheduler(sink: Arc<Sink>) -> ReminderScheduler {
        let dispatcher = TriggerDispatcher::new(Arc::new(Granted), sink, Arc::new(Silent));
        ReminderScheduler::new(Arc::new(dispatcher), Duration::minutes(5))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn armed_timers_fire_at_their_instants() {
        let sink = Arc::new(Sink::default());
        let mut s = scheduler(sink.clone());
        let task = Task::new(TaskId(1), "stretch", now() + Duration::minutes(10));

        let plan = s.schedule(&task, now());
        assert_eq!(plan.armed_count(), 2);
        assert_eq!(s.armed(task.id).len(), 2);

        tokio::time::sleep(std::time::Duration::from_secs(4 * 60)).await;
        assert!(sink.0.lock().unwrap().is_empty());

        tokio::time::sleep(std::time::Duration::from_secs(61)).await;
        assert_eq!(sink.0.lock().unwrap().len(), 1);
        assert_eq!(s.armed(task.id).len(), 1);
        assert_eq!(s.armed(task.id)[0].kind, ReminderKind::Exact);

        tokio::time::sleep(std::time::Duration::from_secs(5 * 60)).await;
        assert_eq!(sink.0.lock().unwrap().len(), 2);
        assert_eq!(s.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timers_never_fire() {
        let sink = Arc::new(Sink::default());
        let mut s = scheduler(sink.clone());
        let task = Task::new(TaskId(2), "stretch", now() + Duration::minutes(10));

        s.schedule(&task, now());
        assert_eq!(s.cancel(task.id), 2);
        assert!(s.armed(task.id).is_empty());

        tokio::time::sleep(std::time::Duration::from_secs(11 * 60)).await;
        assert!(sink.0.lock().unwrap().is_empty());
        assert_eq!(s.cancel(task.id), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retitled_timer_fires_with_new_title() {
        let sink = Arc::new(Sink::default());
        let mut s = scheduler(sink.clone());
        let task = Task::new(TaskId(3), "old", now() + Duration::minutes(2));

        s.schedule(&task, now());
        s.retitle(task.id, "new");

        tokio::time::sleep(std::time::Duration::from_secs(3 * 60)).await;
        assert_eq!(*sink.0.lock().unwrap(), vec!["Do it now: new".to_string()]);
    }

    #[test]
    fn catch_up_fires_pairs_for_each_elapsed_instant() {
        let sink = Arc::new(Sink::default());
        let s = scheduler(sink.clone());
        let task = Task::new(TaskId(4), "overdue", now() - Duration::minutes(10));

        let kinds = s.catch_up(&task, now());
        assert_eq!(kinds, vec![ReminderKind::Early, ReminderKind::Exact]);
        assert_eq!(sink.0.lock().unwrap().len(), 2);
        assert_eq!(s.pending_count(), 0);
    }
}

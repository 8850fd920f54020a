use std::sync::Arc;

use nudge_core::{time::parse_due_time, Clock, Task, TaskId};
use nudge_scheduler::{ArmedReminder, ReminderPlan, ReminderScheduler, SlotDecision};
use tracing::{debug, info};

use crate::error::{Result, TaskError, ValidationError};
use crate::ports::{Dialog, TaskEntry, TaskView};
use crate::store::TaskStore;

/// Collaborators injected into the manager at construction.
pub struct ManagerPorts {
    pub store: Arc<dyn TaskStore>,
    pub view: Arc<dyn TaskView>,
    pub dialog: Arc<dyn Dialog>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy)]
pub struct ManagerOptions {
    /// Arm future reminders for tasks loaded at startup. When false, loaded
    /// tasks only ever get the catch-up pass.
    pub rearm_on_start: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            rearm_on_start: true,
        }
    }
}

/// Owns the task list: persistence, rendering hooks and reminder timers.
///
/// All mutation happens through `&mut self` on one control task. Timers run
/// as separate Tokio tasks but never touch the list.
pub struct TaskManager {
    tasks: Vec<Task>,
    store: Arc<dyn TaskStore>,
    view: Arc<dyn TaskView>,
    dialog: Arc<dyn Dialog>,
    clock: Arc<dyn Clock>,
    scheduler: ReminderScheduler,
}

impl TaskManager {
    /// Load the stored list, render it, and fire every reminder instant that
    /// elapsed while nothing was running.
    pub fn start(ports: ManagerPorts, scheduler: ReminderScheduler, options: ManagerOptions) -> Self {
        let tasks = ports.store.load();
        info!(count = tasks.len(), "tasks loaded");

        let mut manager = Self {
            tasks,
            store: ports.store,
            view: ports.view,
            dialog: ports.dialog,
            clock: ports.clock,
            scheduler,
        };
        manager.render_all_tasks();
        manager.check_and_trigger_reminders();
        if options.rearm_on_start {
            manager.rearm_loaded_tasks();
        }
        manager
    }

    /// Validate input, then create, persist, render and schedule a task.
    ///
    /// On a validation failure the message is shown through the dialog and
    /// the list is left untouched.
    pub fn add_task(&mut self, title: &str, time: &str) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() || time.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyInput));
        }
        let due = match parse_due_time(time) {
            Ok(due) => due,
            Err(e) => {
                debug!(code = e.code(), "rejecting task: {e}");
                return Err(self.reject(ValidationError::InvalidTime));
            }
        };

        let last = self.tasks.iter().map(|t| t.id).max();
        let task = Task::new(TaskId::allocate(self.clock.now(), last), title, due);

        self.tasks.push(task.clone());
        if let Err(e) = self.save_tasks() {
            self.tasks.pop();
            return Err(e);
        }
        self.view.render(&TaskEntry::from_task(&task));
        self.schedule_reminders(&task);

        info!(task_id = %task.id, due = %task.time, "task added");
        Ok(task)
    }

    /// Arm the early and due-time reminders of `task`.
    ///
    /// Every instant that is not in the future is reported to the user; an
    /// early instant that passed while the due time has not is only logged.
    pub fn schedule_reminders(&mut self, task: &Task) -> ReminderPlan {
        let plan = self.scheduler.schedule(task, self.clock.now());
        for (kind, decision) in plan.decisions() {
            if let SlotDecision::Elapsed { at } = decision {
                debug!(task_id = %task.id, %kind, %at, "reminder instant not in the future");
                self.dialog.alert(&ValidationError::NotInFuture.to_string());
            }
        }
        plan
    }

    /// Catch-up pass: fire a trigger pair for every reminder instant of every
    /// task that already lies in the past. Returns the number of pairs fired.
    pub fn check_and_trigger_reminders(&self) -> usize {
        let now = self.clock.now();
        let fired: usize = self
            .tasks
            .iter()
            .map(|task| self.scheduler.catch_up(task, now).len())
            .sum();
        if fired > 0 {
            info!(fired, "overdue reminders fired on startup");
        }
        fired
    }

    /// Replace a task's title. An empty replacement keeps the old title and
    /// returns `Ok(false)`. The due time and armed reminders are left alone.
    pub fn edit_task(&mut self, id: TaskId, new_title: &str) -> Result<bool> {
        let idx = self.index_of(id).ok_or(TaskError::NotFound { id })?;
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Ok(false);
        }

        let old = std::mem::replace(&mut self.tasks[idx].title, new_title.to_string());
        if let Err(e) = self.save_tasks() {
            self.tasks[idx].title = old;
            return Err(e);
        }
        self.scheduler.retitle(id, new_title);
        self.view.update(&TaskEntry::from_task(&self.tasks[idx]));

        info!(task_id = %id, "task edited");
        Ok(true)
    }

    /// Remove a task and cancel its outstanding reminders. Returns whether a
    /// task with that id existed.
    pub fn delete_task(&mut self, id: TaskId) -> Result<bool> {
        let Some(idx) = self.index_of(id) else {
            debug!(task_id = %id, "delete of unknown task ignored");
            return Ok(false);
        };

        let removed = self.tasks.remove(idx);
        if let Err(e) = self.save_tasks() {
            self.tasks.insert(idx, removed);
            return Err(e);
        }
        self.view.remove(id);
        let cancelled = self.scheduler.cancel(id);

        info!(task_id = %id, cancelled, "task deleted");
        Ok(true)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Reminders of a task that are armed and have not fired yet.
    pub fn armed_reminders(&self, id: TaskId) -> Vec<ArmedReminder> {
        self.scheduler.armed(id)
    }

    pub fn pending_reminders(&self) -> usize {
        self.scheduler.pending_count()
    }

    // --- private helpers ---------------------------------------------------

    fn render_all_tasks(&self) {
        for task in &self.tasks {
            self.view.render(&TaskEntry::from_task(task));
        }
    }

    /// Arm still-future instants of loaded tasks without bothering the user
    /// about the ones already in the past.
    fn rearm_loaded_tasks(&mut self) {
        let now = self.clock.now();
        let mut armed = 0;
        for task in &self.tasks {
            armed += self.scheduler.schedule(task, now).armed_count();
        }
        if armed > 0 {
            info!(armed, "reminders re-armed for loaded tasks");
        }
    }

    fn save_tasks(&self) -> Result<()> {
        self.store.save(&self.tasks)?;
        Ok(())
    }

    fn reject(&self, err: ValidationError) -> TaskError {
        self.dialog.alert(&err.to_string());
        TaskError::Validation(err)
    }

    fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

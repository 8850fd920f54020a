use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::TriggerError;
use crate::types::{
    AlarmPlayer, AlarmTrigger, AudioResource, Notification, NotificationPermission,
    NotificationSink, NotificationTemplate, NotificationTrigger, PermissionPort, Trigger,
    TriggerOutcome,
};

/// Executes triggers against the presentation ports.
///
/// Shared by every armed timer as `Arc<TriggerDispatcher>`; firing never
/// blocks on the presentation layer and never propagates failures.
pub struct TriggerDispatcher {
    permission: Arc<dyn PermissionPort>,
    notifier: Arc<dyn NotificationSink>,
    player: Arc<dyn AlarmPlayer>,
    template: NotificationTemplate,
    sound: Option<AudioResource>,
}

impl TriggerDispatcher {
    pub fn new(
        permission: Arc<dyn PermissionPort>,
        notifier: Arc<dyn NotificationSink>,
        player: Arc<dyn AlarmPlayer>,
    ) -> Self {
        Self {
            permission,
            notifier,
            player,
            template: NotificationTemplate::default(),
            sound: None,
        }
    }

    pub fn with_template(mut self, template: NotificationTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_sound(mut self, sound: Option<AudioResource>) -> Self {
        self.sound = sound;
        self
    }

    /// Ask the permission port once and log the answer. Task creation never
    /// waits on or depends on the result.
    pub fn request_permission(&self) -> NotificationPermission {
        let permission = self.permission.request();
        match permission {
            NotificationPermission::Granted => info!("notification permission granted"),
            other => warn!(permission = %other, "notification permission not granted"),
        }
        permission
    }

    /// Fire one trigger and log how it went.
    pub fn fire(&self, trigger: &Trigger) -> TriggerOutcome {
        let t = Instant::now();
        let outcome = trigger.trigger(self);
        let elapsed_ms = t.elapsed().as_millis() as u64;

        match &outcome {
            TriggerOutcome::Delivered => debug!(
                trigger = trigger.name(),
                task = %trigger.task_title(),
                duration_ms = elapsed_ms,
                "trigger delivered"
            ),
            TriggerOutcome::Skipped { reason } => debug!(
                trigger = trigger.name(),
                task = %trigger.task_title(),
                reason = %reason,
                "trigger skipped"
            ),
            TriggerOutcome::Failed { error } => warn!(
                trigger = trigger.name(),
                task = %trigger.task_title(),
                error = %error,
                "trigger failed"
            ),
        }
        outcome
    }

    /// Fire the alarm + notification pair for one reminder instant.
    pub fn fire_pair(&self, task_title: &str, scheduled_time: DateTime<Utc>) -> [TriggerOutcome; 2] {
        Trigger::pair(task_title, scheduled_time).map(|trigger| self.fire(&trigger))
    }
}

impl Trigger {
    /// Perform the trigger's side effect through the dispatcher's ports.
    pub fn trigger(&self, ports: &TriggerDispatcher) -> TriggerOutcome {
        match self {
            Trigger::Alarm(alarm) => alarm.trigger(ports),
            Trigger::Notification(notification) => notification.trigger(ports),
        }
    }
}

impl NotificationTrigger {
    fn trigger(&self, ports: &TriggerDispatcher) -> TriggerOutcome {
        let permission = ports.permission.state();
        if permission != NotificationPermission::Granted {
            warn!(permission = %permission, "notification permission not granted");
            return TriggerOutcome::skipped(format!("notification permission is {permission}"));
        }

        let notification = Notification {
            title: ports.template.title.clone(),
            body: ports.template.body_for(&self.task_title),
            tag: ports.template.tag.clone(),
            icon: ports.template.icon.clone(),
        };
        outcome_of(ports.notifier.show(&notification))
    }
}

impl AlarmTrigger {
    fn trigger(&self, ports: &TriggerDispatcher) -> TriggerOutcome {
        match &ports.sound {
            None => TriggerOutcome::skipped("no alarm sound configured"),
            Some(sound) if !sound.is_available() => {
                TriggerOutcome::skipped(format!("alarm sound missing: {}", sound.path.display()))
            }
            Some(sound) => outcome_of(ports.player.play(sound)),
        }
    }
}

fn outcome_of(result: crate::error::Result<()>) -> TriggerOutcome {
    match result {
        Ok(()) => TriggerOutcome::Delivered,
        Err(TriggerError::Unavailable(reason)) => TriggerOutcome::Skipped { reason },
        Err(e) => TriggerOutcome::Failed {
            error: e.to_string(),
        },
    }
}

//! Wiring: turns a loaded [`NudgeConfig`] into a running [`TaskManager`].

use std::sync::Arc;

use nudge_core::{NudgeConfig, SystemClock};
use nudge_scheduler::ReminderScheduler;
use nudge_tasks::{Dialog, ManagerOptions, ManagerPorts, SqliteSlotStore, TaskManager, TaskView};
use nudge_triggers::system::{CommandAlarm, CommandNotifier, ConfiguredPermission, TerminalNotifier};
use nudge_triggers::{AudioResource, NotificationSink, NotificationTemplate, TriggerDispatcher};
use tracing::{info, warn};

/// Build the trigger dispatcher from config and ask for notification
/// permission once.
pub fn build_dispatcher(config: &NudgeConfig) -> TriggerDispatcher {
    let permission = Arc::new(ConfiguredPermission::new(config.notifications.enabled));

    let notifier: Arc<dyn NotificationSink> =
        match CommandNotifier::detect(config.notifications.command.as_deref()) {
            Some(cmd) => {
                info!("desktop notifications enabled");
                Arc::new(cmd)
            }
            None => {
                if config.notifications.command.is_some() {
                    warn!("notification command not found on PATH, printing to the terminal");
                }
                Arc::new(TerminalNotifier::new())
            }
        };

    let player = Arc::new(CommandAlarm::detect(config.alarm.player.as_deref()));
    let sound = config.alarm.sound_path.as_deref().map(AudioResource::new);
    if let Some(sound) = &sound {
        if !sound.is_available() {
            warn!(path = %sound.path.display(), "alarm sound file not found; alarms will be silent");
        }
    }

    let dispatcher = TriggerDispatcher::new(permission, notifier, player)
        .with_template(NotificationTemplate {
            title: config.notifications.title.clone(),
            tag: config.notifications.tag.clone(),
            icon: config.notifications.icon.clone(),
        })
        .with_sound(sound);
    dispatcher.request_permission();
    dispatcher
}

/// Open the store and start the manager. Runs the startup catch-up pass.
pub fn start_manager(
    config: &NudgeConfig,
    view: Arc<dyn TaskView>,
    dialog: Arc<dyn Dialog>,
) -> anyhow::Result<TaskManager> {
    info!(path = %config.storage.path, slot = %config.storage.slot, "opening task store");
    let store = SqliteSlotStore::open(&config.storage.path, config.storage.slot.clone())?;

    let scheduler = ReminderScheduler::new(
        Arc::new(build_dispatcher(config)),
        config.reminders.lead(),
    );

    Ok(TaskManager::start(
        ManagerPorts {
            store: Arc::new(store),
            view,
            dialog,
            clock: Arc::new(SystemClock),
        },
        scheduler,
        ManagerOptions {
            rearm_on_start: config.reminders.rearm_on_start,
        },
    ))
}

//! `nudge-triggers`: the actions performed at a reminder instant.
//!
//! Two variants exist, [`Trigger::Alarm`] and [`Trigger::Notification`].
//! Both are fired through a [`TriggerDispatcher`], which owns the
//! presentation ports:
//!
//! | Port               | Real implementation                         |
//! |--------------------|---------------------------------------------|
//! | `PermissionPort`   | `ConfiguredPermission` (answer from config) |
//! | `NotificationSink` | `CommandNotifier`, `TerminalNotifier`       |
//! | `AlarmPlayer`      | `CommandAlarm` (paplay / aplay / afplay)    |

pub mod dispatcher;
pub mod error;
pub mod system;
pub mod types;

pub use dispatcher::TriggerDispatcher;
pub use error::{Result, TriggerError};
pub use types::{
    AlarmPlayer, AudioResource, Notification, NotificationPermission, NotificationSink,
    NotificationTemplate, PermissionPort, Trigger, TriggerOutcome,
};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_SLOT: &str = "tasks";
pub const DEFAULT_LEAD_MINUTES: i64 = 5;
pub const NOTIFICATION_TITLE: &str = "Task Reminder!";
pub const NOTIFICATION_TAG: &str = "to-do-reminder";

/// Top-level config (nudge.toml + NUDGE_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NudgeConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the key-value slots.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Name of the slot the task list is stored under.
    #[serde(default = "default_slot")]
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            slot: default_slot(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// How long before the due time the early reminder fires.
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,
    /// Arm timers for still-future instants of tasks loaded at startup.
    /// When false, loaded tasks only get the catch-up pass.
    #[serde(default = "bool_true")]
    pub rearm_on_start: bool,
}

impl ReminderConfig {
    /// Negative values clamp to zero; values too large for a duration fall
    /// back to the default lead.
    pub fn lead(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.lead_minutes.max(0)).unwrap_or_else(|| {
            warn!(
                lead_minutes = self.lead_minutes,
                default = DEFAULT_LEAD_MINUTES,
                "reminder lead out of range, using default"
            );
            chrono::Duration::minutes(DEFAULT_LEAD_MINUTES)
        })
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_minutes: DEFAULT_LEAD_MINUTES,
            rearm_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Answer given to the startup permission request.
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_title")]
    pub title: String,
    /// Presentation-layer de-duplication tag; repeated fires with the same tag coalesce.
    #[serde(default = "default_tag")]
    pub tag: String,
    pub icon: Option<String>,
    /// Desktop notification command (e.g. `notify-send`). Falls back to the
    /// terminal when unset or not found on PATH.
    pub command: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: default_title(),
            tag: default_tag(),
            icon: None,
            command: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Audio file played by the alarm trigger. No file, no sound.
    pub sound_path: Option<String>,
    /// Player binary. Auto-detected from PATH when unset.
    pub player: Option<String>,
}

fn bool_true() -> bool {
    true
}
fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}
fn default_lead_minutes() -> i64 {
    DEFAULT_LEAD_MINUTES
}
fn default_title() -> String {
    NOTIFICATION_TITLE.to_string()
}
fn default_tag() -> String {
    NOTIFICATION_TAG.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.nudge/nudge.db", home)
}

impl NudgeConfig {
    /// Load config from a TOML file with NUDGE_* env var overrides.
    ///
    /// Nested keys use a double underscore: `NUDGE_REMINDERS__LEAD_MINUTES=10`.
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        debug!(%path, "loading config");

        let config: NudgeConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("NUDGE_").split("__"))
            .extract()
            .map_err(|e| crate::error::NudgeError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.nudge/nudge.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = NudgeConfig::load(Some("does-not-exist.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.storage.slot, "tasks");
            assert_eq!(config.reminders.lead_minutes, 5);
            assert!(config.reminders.rearm_on_start);
            assert_eq!(config.notifications.title, "Task Reminder!");
            assert_eq!(config.notifications.tag, "to-do-reminder");
            assert!(config.alarm.sound_path.is_none());
            Ok(())
        });
    }

    #[test]
    fn file_values_and_env_overrides_merge() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "nudge.toml",
                r#"
                [storage]
                path = "/tmp/nudge-test.db"

                [reminders]
                rearm_on_start = false

                [alarm]
                sound_path = "/usr/share/sounds/alarm.oga"
                "#,
            )?;
            jail.set_env("NUDGE_REMINDERS__LEAD_MINUTES", "10");

            let config = NudgeConfig::load(Some("nudge.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.storage.path, "/tmp/nudge-test.db");
            assert_eq!(config.storage.slot, "tasks");
            assert!(!config.reminders.rearm_on_start);
            assert_eq!(config.reminders.lead(), chrono::Duration::minutes(10));
            assert_eq!(
                config.alarm.sound_path.as_deref(),
                Some("/usr/share/sounds/alarm.oga")
            );
            Ok(())
        });
    }

    #[test]
    fn negative_lead_is_clamped() {
        let cfg = ReminderConfig {
            lead_minutes: -3,
            rearm_on_start: true,
        };
        assert_eq!(cfg.lead(), chrono::Duration::zero());
    }

    #[test]
    fn oversized_lead_falls_back_to_default() {
        let cfg = ReminderConfig {
            lead_minutes: i64::MAX,
            rearm_on_start: true,
        };
        assert_eq!(cfg.lead(), chrono::Duration::minutes(DEFAULT_LEAD_MINUTES));
    }

    #[test]
    fn oversized_lead_from_env_loads() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NUDGE_REMINDERS__LEAD_MINUTES", i64::MAX.to_string());
            let config = NudgeConfig::load(Some("missing.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.reminders.lead(), chrono::Duration::minutes(5));
            Ok(())
        });
    }
}

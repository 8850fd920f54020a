//! Real presentation ports: config-driven permission, terminal and desktop
//! notifiers, and a command-line audio player.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Result, TriggerError};
use crate::types::{
    AlarmPlayer, AudioResource, Notification, NotificationPermission, NotificationSink,
    PermissionPort,
};

/// Players tried in order when none is configured. Each takes the file as its only argument.
const PLAYER_CANDIDATES: &[&str] = &["paplay", "aplay", "afplay"];
const DEFAULT_NOTIFY_COMMAND: &str = "notify-send";
/// Identical notifications (same tag and body) inside this window are shown once.
const COALESCE_WINDOW: Duration = Duration::from_secs(2);

/// Permission whose answer comes from configuration instead of a prompt.
pub struct ConfiguredPermission {
    grant_on_request: bool,
    state: Mutex<NotificationPermission>,
}

impl ConfiguredPermission {
    pub fn new(grant_on_request: bool) -> Self {
        Self {
            grant_on_request,
            state: Mutex::new(NotificationPermission::Default),
        }
    }
}

impl PermissionPort for ConfiguredPermission {
    fn state(&self) -> NotificationPermission {
        *self.state.lock().expect("permission state poisoned")
    }

    fn request(&self) -> NotificationPermission {
        let mut state = self.state.lock().expect("permission state poisoned");
        if *state == NotificationPermission::Default {
            *state = if self.grant_on_request {
                NotificationPermission::Granted
            } else {
                NotificationPermission::Denied
            };
        }
        *state
    }
}

/// Prints notifications to stdout.
pub struct TerminalNotifier {
    last: Mutex<Option<(String, String, Instant)>>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Terminal output cannot be replaced in place, so coalescing a tag means
    /// dropping an identical repeat that arrives right after the original.
    fn should_show(&self, notification: &Notification, now: Instant) -> bool {
        let mut last = self.last.lock().expect("notifier state poisoned");
        let repeat = matches!(
            last.as_ref(),
            Some((tag, body, at))
                if *tag == notification.tag
                    && *body == notification.body
                    && now.duration_since(*at) < COALESCE_WINDOW
        );
        if !repeat {
            *last = Some((notification.tag.clone(), notification.body.clone(), now));
        }
        !repeat
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for TerminalNotifier {
    fn show(&self, notification: &Notification) -> Result<()> {
        if !self.should_show(notification, Instant::now()) {
            debug!(tag = %notification.tag, "notification coalesced");
            return Ok(());
        }
        println!("\x07[{}] {}", notification.title, notification.body);
        Ok(())
    }
}

/// Desktop notifications through a `notify-send` compatible command.
///
/// The tag is passed as the synchronous-replace hint so a newer notification
/// with the same tag replaces the previous one on screen.
pub struct CommandNotifier {
    program: PathBuf,
}

impl CommandNotifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `command` (or `notify-send`) on PATH.
    pub fn detect(command: Option<&str>) -> Option<Self> {
        let name = command.unwrap_or(DEFAULT_NOTIFY_COMMAND);
        which::which(name).ok().map(Self::new)
    }

    fn args(notification: &Notification) -> Vec<String> {
        let mut args = vec![
            "--app-name=nudge".to_string(),
            format!(
                "--hint=string:x-canonical-private-synchronous:{}",
                notification.tag
            ),
        ];
        if let Some(icon) = &notification.icon {
            args.push(format!("--icon={icon}"));
        }
        args.push(notification.title.clone());
        args.push(notification.body.clone());
        args
    }
}

impl NotificationSink for CommandNotifier {
    fn show(&self, notification: &Notification) -> Result<()> {
        spawn_detached(&self.program, &Self::args(notification))
    }
}

/// Plays the alarm sound with an external audio player.
pub struct CommandAlarm {
    player: Option<PathBuf>,
}

impl CommandAlarm {
    pub fn new(player: Option<PathBuf>) -> Self {
        Self { player }
    }

    /// Use the configured player if it resolves, otherwise the first known player on PATH.
    pub fn detect(configured: Option<&str>) -> Self {
        let player = match configured {
            Some(name) => which::which(name).ok(),
            None => PLAYER_CANDIDATES
                .iter()
                .find_map(|name| which::which(name).ok()),
        };
        match &player {
            Some(path) => info!(player = %path.display(), "alarm player selected"),
            None => info!("no alarm player found; alarms will be silent"),
        }
        Self::new(player)
    }
}

impl AlarmPlayer for CommandAlarm {
    fn play(&self, resource: &AudioResource) -> Result<()> {
        let player = self
            .player
            .as_ref()
            .ok_or_else(|| TriggerError::Unavailable("no audio player found".into()))?;
        spawn_detached(player, &[resource.path.display().to_string()])
    }
}

/// Start `program` without waiting for it. A helper thread reaps the child
/// so finished players do not linger as zombies.
fn spawn_detached(program: &Path, args: &[String]) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| TriggerError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    let program = program.display().to_string();
    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => debug!(%program, %status, "command exited with failure"),
        Err(e) => debug!(%program, "failed to wait for command: {e}"),
        _ => {}
    });
    Ok(())
}

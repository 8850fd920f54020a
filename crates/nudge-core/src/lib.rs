//! `nudge-core`: shared task types, configuration and time handling.

pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use config::NudgeConfig;
pub use error::{NudgeError, Result};
pub use types::{Clock, ManualClock, SystemClock, Task, TaskId};

//! `nudge-tasks`: the task manager and its ports.
//!
//! The manager owns the task list and orchestrates persistence
//! ([`store::TaskStore`]), rendering ([`ports::TaskView`]), user messages
//! ([`ports::Dialog`]) and reminder timers (`nudge-scheduler`).

pub mod db;
pub mod error;
pub mod manager;
pub mod ports;
pub mod store;

pub use error::{Result, StoreError, TaskError, ValidationError};
pub use manager::{ManagerOptions, ManagerPorts, TaskManager};
pub use ports::{Dialog, TaskEntry, TaskView};
pub use store::{SqliteSlotStore, TaskStore};

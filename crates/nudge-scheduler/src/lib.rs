//! `nudge-scheduler`: reminder timers for tasks.
//!
//! # Overview
//!
//! Every task has two reminder instants: `due - lead` (early) and `due`
//! (exact). [`schedule::plan_reminders`] decides once, against "now", which
//! of them still get a timer; [`engine::ReminderScheduler`] arms those as
//! one-shot Tokio tasks and keeps their abort handles per task so a deleted
//! task's reminders can be cancelled.
//!
//! | Early instant | Due instant | Result                                   |
//! |---------------|-------------|------------------------------------------|
//! | future        | future      | both armed                               |
//! | past          | future      | early skipped (logged), exact armed      |
//! | past          | past        | both elapsed, nothing armed              |
//!
//! The startup catch-up pass ([`engine::ReminderScheduler::catch_up`]) fires
//! every instant already in the past immediately instead.

pub mod engine;
pub mod schedule;
pub mod types;

pub use engine::ReminderScheduler;
pub use types::{ArmedReminder, ReminderKind, ReminderPlan, SlotDecision};

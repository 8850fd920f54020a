use std::path::Path;
use std::sync::Mutex;

use nudge_core::Task;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::{db::init_db, error::StoreError};

/// Persistence port for the task list.
pub trait TaskStore: Send + Sync {
    /// Read the stored list. Absent or malformed data yields an empty list.
    fn load(&self) -> Vec<Task>;

    /// Replace the stored list.
    fn save(&self, tasks: &[Task]) -> Result<(), StoreError>;
}

/// Task list stored as JSON in one named slot of a SQLite key-value table.
pub struct SqliteSlotStore {
    conn: Mutex<Connection>,
    slot: String,
}

impl SqliteSlotStore {
    pub fn new(conn: Connection, slot: impl Into<String>) -> Result<Self, StoreError> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            slot: slot.into(),
        })
    }

    /// Open (or create) the database file, creating its parent directory.
    pub fn open(path: impl AsRef<Path>, slot: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::new(Connection::open(path)?, slot)
    }

    pub fn in_memory(slot: impl Into<String>) -> Result<Self, StoreError> {
        Self::new(Connection::open_in_memory()?, slot)
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The raw slot contents, if the slot was ever written.
    pub fn read_raw(&self) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1",
                [&self.slot],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Overwrite the slot with arbitrary text.
    pub fn write_raw(&self, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![self.slot, value, now],
        )?;
        Ok(())
    }
}

impl TaskStore for SqliteSlotStore {
    fn load(&self) -> Vec<Task> {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(slot = %self.slot, "task slot unreadable, starting empty: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(slot = %self.slot, "task slot malformed, starting empty: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let json = serde_json::to_string(tasks)?;
        self.write_raw(&json)?;
        debug!(slot = %self.slot, count = tasks.len(), "tasks saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nudge_core::TaskId;

    fn sample() -> Vec<Task> {
        vec![
            Task::new(
                TaskId(1),
                "buy milk",
                Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap(),
            ),
            Task::new(
                TaskId(2),
                "call dentist",
                Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
            ),
        ]
    }

    #[test]
    fn empty_slot_loads_empty_list() {
        let store = SqliteSlotStore::in_memory("tasks").unwrap();
        assert!(store.load().is_empty());
        assert!(store.read_raw().unwrap().is_none());
    }

    #[test]
    fn saved_list_reloads_in_order() {
        let store = SqliteSlotStore::in_memory("tasks").unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn malformed_slot_fails_soft() {
        let store = SqliteSlotStore::in_memory("tasks").unwrap();
        store.write_raw("{not json").unwrap();
        assert!(store.load().is_empty());

        store.write_raw("null").unwrap();
        assert!(store.load().is_empty());

        store
            .write_raw(r#"[{"id":1,"title":"x","time":"Invalid Date"}]"#)
            .unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("nudge.db");

        let work = SqliteSlotStore::open(&path, "work").unwrap();
        work.save(&sample()).unwrap();

        let home = SqliteSlotStore::open(&path, "home").unwrap();
        assert!(home.load().is_empty());
        assert_eq!(home.slot(), "home");

        // A second handle on the same file sees what the first wrote.
        let reopened = SqliteSlotStore::open(&path, "work").unwrap();
        assert_eq!(reopened.load(), sample());
    }

    #[test]
    fn stored_format_is_a_flat_json_array() {
        let store = SqliteSlotStore::in_memory("tasks").unwrap();
        store.save(&sample()[..1]).unwrap();
        assert_eq!(
            store.read_raw().unwrap().unwrap(),
            r#"[{"id":1,"title":"buy milk","time":"2026-10-18T08:00:00.000Z"}]"#
        );
    }
}

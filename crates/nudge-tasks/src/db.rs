use rusqlite::Connection;

use crate::error::StoreError;

/// Initialise the key-value slot schema in `conn`.
///
/// One row per named slot; the task list lives in a single slot as JSON text.
pub fn init_db(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_slots (
            key         TEXT    NOT NULL PRIMARY KEY,
            value       TEXT    NOT NULL,   -- serialized payload
            updated_at  TEXT    NOT NULL    -- ISO-8601
        ) STRICT;
        ",
    )?;
    Ok(())
}

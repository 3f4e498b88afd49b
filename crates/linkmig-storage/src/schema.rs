use crate::StorageError;
use rusqlite::{Connection, OptionalExtension};

const LINK_TAXONOMY_SCHEMA: &str = include_str!("../migrations/0001_link_taxonomy.sql");

/// Owned by the CMS; `links.user_id` points at it.
pub const USERS_TABLE: &str = "users";

pub(crate) fn ensure_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(LINK_TAXONOMY_SCHEMA)?;
    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table_name: &str) -> Result<bool, StorageError> {
    let exists = conn
        .query_row(
            "
            SELECT 1
            FROM sqlite_master
            WHERE type='table' AND name = ?1
            LIMIT 1
            ",
            [table_name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(exists.is_some())
}

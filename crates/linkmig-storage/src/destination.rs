use crate::rows::{read_categories, read_link_to_tag, read_links, read_tags, tag_from_row};
use crate::schema::{ensure_schema, table_exists};
use crate::StorageError;
use linkmig_core::{LegacyCategory, LegacyLink, LegacyLinkToTag, LegacyTag};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Read-write handle on the CMS database that receives the tag taxonomy.
pub struct DestinationStore {
    conn: Connection,
}

impl DestinationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        // Must be set outside a transaction; sqlite ignores it inside one.
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        ensure_schema(&self.conn)
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool, StorageError> {
        table_exists(&self.conn, table_name)
    }

    pub fn begin(&mut self) -> Result<DestinationWriter<'_>, StorageError> {
        Ok(DestinationWriter {
            tx: self.conn.transaction()?,
        })
    }

    pub fn tags(&self) -> Result<Vec<LegacyTag>, StorageError> {
        read_tags(&self.conn)
    }

    pub fn categories(&self) -> Result<Vec<LegacyCategory>, StorageError> {
        read_categories(&self.conn)
    }

    pub fn links(&self) -> Result<Vec<LegacyLink>, StorageError> {
        read_links(&self.conn)
    }

    pub fn link_to_tag(&self) -> Result<Vec<LegacyLinkToTag>, StorageError> {
        read_link_to_tag(&self.conn)
    }

    pub fn find_tag_id_by_name(&self, name: &str) -> Result<Option<i64>, StorageError> {
        find_tag_id_by_name(&self.conn, name)
    }
}

/// All writes of one migration run. Dropping the writer without calling
/// [`DestinationWriter::commit`] rolls everything back.
pub struct DestinationWriter<'a> {
    tx: Transaction<'a>,
}

impl DestinationWriter<'_> {
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        ensure_schema(&self.tx)
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool, StorageError> {
        table_exists(&self.tx, table_name)
    }

    /// Inserts a legacy tag under its original id. An identical row already
    /// stored under that id is accepted; a different one is a conflict.
    pub fn insert_legacy_tag(&self, tag: &LegacyTag) -> Result<InsertOutcome, StorageError> {
        let existing = self
            .tx
            .query_row(
                "SELECT id, user_id, name, color FROM link_tags WHERE id = ?1",
                [tag.id],
                tag_from_row,
            )
            .optional()?;
        match existing {
            Some(stored) if stored == *tag => Ok(InsertOutcome::AlreadyPresent),
            Some(_) => Err(StorageError::ConflictingRow {
                table: "link_tags",
                id: tag.id,
            }),
            None => {
                self.tx
                    .prepare_cached(
                        "INSERT INTO link_tags (id, user_id, name, color) VALUES (?1, ?2, ?3, ?4)",
                    )?
                    .execute(params![tag.id, tag.user_id, tag.name, tag.color])
                    .map_err(insert_failed("link_tags", tag.id))?;
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    pub fn insert_category(&self, id: i64, name: &str) -> Result<InsertOutcome, StorageError> {
        let existing: Option<String> = self
            .tx
            .query_row(
                "SELECT name FROM link_categories WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        match existing {
            Some(stored) if stored == name => Ok(InsertOutcome::AlreadyPresent),
            Some(_) => Err(StorageError::ConflictingRow {
                table: "link_categories",
                id,
            }),
            None => {
                self.tx
                    .prepare_cached("INSERT INTO link_categories (id, name) VALUES (?1, ?2)")?
                    .execute(params![id, name])
                    .map_err(insert_failed("link_categories", id))?;
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    pub fn find_tag_id_by_name(&self, name: &str) -> Result<Option<i64>, StorageError> {
        find_tag_id_by_name(&self.tx, name)
    }

    /// Inserts a tag with a store-assigned id and returns that id. `None`
    /// means the store accepted the row but reported no id for it.
    pub fn insert_tag(
        &self,
        user_id: i64,
        name: &str,
        color: &str,
    ) -> Result<Option<i64>, StorageError> {
        let id: Option<Option<i64>> = self
            .tx
            .prepare_cached(
                "INSERT INTO link_tags (user_id, name, color) VALUES (?1, ?2, ?3) RETURNING id",
            )?
            .query_row(params![user_id, name, color], |row| row.get(0))
            .optional()
            .map_err(|source| StorageError::TagInsert {
                name: name.to_string(),
                source,
            })?;
        Ok(id.flatten())
    }

    pub fn insert_link(&self, link: &LegacyLink, category_id: i64) -> Result<(), StorageError> {
        self.tx
            .prepare_cached(
                "
                INSERT INTO links (
                    id,
                    user_id,
                    created_at,
                    modified_at,
                    title,
                    url,
                    comment,
                    category_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )?
            .execute(params![
                link.id,
                link.user_id,
                link.created_at,
                link.modified_at,
                link.title,
                link.url,
                link.comment,
                category_id,
            ])
            .map_err(insert_failed("links", link.id))?;
        Ok(())
    }

    /// Highest `link_to_tag` id stored so far, 0 for an empty table.
    pub fn max_assignment_id(&self) -> Result<i64, StorageError> {
        Ok(self
            .tx
            .query_row("SELECT COALESCE(MAX(id), 0) FROM link_to_tag", [], |row| {
                row.get(0)
            })?)
    }

    pub fn insert_assignment(&self, assignment: &LegacyLinkToTag) -> Result<(), StorageError> {
        self.tx
            .prepare_cached("INSERT INTO link_to_tag (id, link_id, tag_id) VALUES (?1, ?2, ?3)")?
            .execute(params![assignment.id, assignment.link_id, assignment.tag_id])
            .map_err(insert_failed("link_to_tag", assignment.id))?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), StorageError> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback()?;
        Ok(())
    }
}

fn insert_failed(table: &'static str, id: i64) -> impl FnOnce(rusqlite::Error) -> StorageError {
    move |source| StorageError::Insert { table, id, source }
}

fn find_tag_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>, StorageError> {
    Ok(conn
        .query_row(
            "SELECT id FROM link_tags WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?)
}

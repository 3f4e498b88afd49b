use crate::rows::{read_categories, read_link_to_tag, read_links, read_tags};
use crate::StorageError;
use linkmig_core::{LegacyCategory, LegacyLink, LegacyLinkToTag, LegacySnapshot, LegacyTag};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Read-only handle on the exported legacy database.
pub struct SourceStore {
    conn: Connection,
    path: PathBuf,
}

impl SourceStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        // Opening read-only never creates the file, but the sqlite error for a
        // missing file does not say which path was tried.
        if !path.is_file() {
            return Err(StorageError::MissingSource { path });
        }
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn links(&self) -> Result<Vec<LegacyLink>, StorageError> {
        read_links(&self.conn)
    }

    pub fn tags(&self) -> Result<Vec<LegacyTag>, StorageError> {
        read_tags(&self.conn)
    }

    pub fn categories(&self) -> Result<Vec<LegacyCategory>, StorageError> {
        read_categories(&self.conn)
    }

    pub fn link_to_tag(&self) -> Result<Vec<LegacyLinkToTag>, StorageError> {
        read_link_to_tag(&self.conn)
    }

    pub fn snapshot(&self) -> Result<LegacySnapshot, StorageError> {
        Ok(LegacySnapshot {
            links: self.links()?,
            tags: self.tags()?,
            categories: self.categories()?,
            link_to_tag: self.link_to_tag()?,
        })
    }
}

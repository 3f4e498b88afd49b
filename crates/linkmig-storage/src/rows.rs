//! Row readers shared by the source and destination stores. Both sides use the
//! same table names and column sets; only constraints differ.

use crate::StorageError;
use linkmig_core::{LegacyCategory, LegacyLink, LegacyLinkToTag, LegacyTag};
use rusqlite::{Connection, Row};

pub(crate) fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LegacyLink> {
    Ok(LegacyLink {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: row.get(2)?,
        modified_at: row.get(3)?,
        title: row.get(4)?,
        url: row.get(5)?,
        comment: row.get(6)?,
        category_id: row.get(7)?,
    })
}

pub(crate) fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<LegacyTag> {
    Ok(LegacyTag {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<LegacyCategory> {
    Ok(LegacyCategory {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn link_to_tag_from_row(row: &Row<'_>) -> rusqlite::Result<LegacyLinkToTag> {
    Ok(LegacyLinkToTag {
        id: row.get(0)?,
        link_id: row.get(1)?,
        tag_id: row.get(2)?,
    })
}

pub(crate) fn read_links(conn: &Connection) -> Result<Vec<LegacyLink>, StorageError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, user_id, created_at, modified_at, title, url, comment, category_id
        FROM links
        ",
    )?;
    let rows = stmt.query_map([], link_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn read_tags(conn: &Connection) -> Result<Vec<LegacyTag>, StorageError> {
    let mut stmt = conn.prepare("SELECT id, user_id, name, color FROM link_tags")?;
    let rows = stmt.query_map([], tag_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn read_categories(conn: &Connection) -> Result<Vec<LegacyCategory>, StorageError> {
    let mut stmt = conn.prepare("SELECT id, name FROM link_categories")?;
    let rows = stmt.query_map([], category_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn read_link_to_tag(conn: &Connection) -> Result<Vec<LegacyLinkToTag>, StorageError> {
    let mut stmt = conn.prepare("SELECT id, link_id, tag_id FROM link_to_tag")?;
    let rows = stmt.query_map([], link_to_tag_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

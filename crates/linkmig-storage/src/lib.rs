mod destination;
mod rows;
mod schema;
mod source;

pub use destination::{DestinationStore, DestinationWriter, InsertOutcome};
pub use schema::USERS_TABLE;
pub use source::SourceStore;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("source database not found at {}", path.display())]
    MissingSource { path: PathBuf },
    #[error("{table} row {id} already exists in the destination with different contents")]
    ConflictingRow { table: &'static str, id: i64 },
    #[error("failed to insert {table} row {id}: {source}")]
    Insert {
        table: &'static str,
        id: i64,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to insert tag {name:?}: {source}")]
    TagInsert {
        name: String,
        #[source]
        source: rusqlite::Error,
    },
}

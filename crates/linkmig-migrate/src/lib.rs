mod dedup;
mod orchestrator;
mod report;
mod verify;

pub use dedup::{TagCatalog, TagDeduplicator, TagResolution};
pub use orchestrator::{run_migration, MigrationOptions};
pub use report::MigrationReport;
pub use verify::{verify_migration, VerificationReport, Violation};

use linkmig_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("link {link_id} has no category_id")]
    LinkWithoutCategory { link_id: i64 },
    #[error("failed to create tag for category {category}")]
    MissingTagId { category: String },
    #[error("destination has no users table; links cannot reference their owners")]
    MissingUsersTable,
}

use crate::MigrationError;
use linkmig_core::{category_tag_name, CategoryOwners};
use linkmig_storage::{DestinationWriter, StorageError};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagResolution {
    Created(i64),
    Reused(i64),
}

impl TagResolution {
    pub fn tag_id(self) -> i64 {
        match self {
            TagResolution::Created(id) | TagResolution::Reused(id) => id,
        }
    }
}

/// Tag lookups and inserts the deduplicator needs from the destination.
pub trait TagCatalog {
    fn find_tag_id_by_name(&self, name: &str) -> Result<Option<i64>, StorageError>;
    fn insert_tag(&self, user_id: i64, name: &str, color: &str)
        -> Result<Option<i64>, StorageError>;
}

impl TagCatalog for DestinationWriter<'_> {
    fn find_tag_id_by_name(&self, name: &str) -> Result<Option<i64>, StorageError> {
        DestinationWriter::find_tag_id_by_name(self, name)
    }

    fn insert_tag(
        &self,
        user_id: i64,
        name: &str,
        color: &str,
    ) -> Result<Option<i64>, StorageError> {
        DestinationWriter::insert_tag(self, user_id, name, color)
    }
}

/// Maps each legacy category onto a `category:<name>` tag, creating the tag
/// only when no tag of that name exists yet.
pub struct TagDeduplicator<'a> {
    owners: &'a CategoryOwners,
    tag_ids: BTreeMap<i64, i64>,
}

impl<'a> TagDeduplicator<'a> {
    pub fn new(owners: &'a CategoryOwners) -> Self {
        Self {
            owners,
            tag_ids: BTreeMap::new(),
        }
    }

    pub fn ensure_tag_for_category(
        &mut self,
        catalog: &impl TagCatalog,
        category_id: i64,
        category_name: &str,
    ) -> Result<TagResolution, MigrationError> {
        if let Some(tag_id) = self.tag_ids.get(&category_id) {
            return Ok(TagResolution::Reused(*tag_id));
        }

        let tag_name = category_tag_name(category_name);
        let resolution = match catalog.find_tag_id_by_name(&tag_name)? {
            Some(tag_id) => {
                debug!(event = "category_tag_reused", category_id, tag_id, tag = %tag_name);
                TagResolution::Reused(tag_id)
            }
            None => {
                let owner_id = self.owners.owner_or_fallback(category_id);
                let tag_id = catalog.insert_tag(owner_id, &tag_name, "")?.ok_or_else(|| {
                    MigrationError::MissingTagId {
                        category: category_name.to_string(),
                    }
                })?;
                debug!(event = "category_tag_created", category_id, tag_id, owner_id, tag = %tag_name);
                TagResolution::Created(tag_id)
            }
        };

        self.tag_ids.insert(category_id, resolution.tag_id());
        Ok(resolution)
    }

    pub fn tag_for_category(&self, category_id: i64) -> Option<i64> {
        self.tag_ids.get(&category_id).copied()
    }
}

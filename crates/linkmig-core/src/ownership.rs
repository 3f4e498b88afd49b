//! Owner selection for category-derived tags.
//!
//! A legacy category carried no owner of its own, yet every tag needs exactly
//! one. The owner is taken from the first link, in source row order, that
//! references the category. This is a heuristic: the legacy data may contain
//! categories shared by several users, and only the earliest one is kept.

use crate::legacy::LegacyLink;
use crate::FALLBACK_OWNER_ID;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryOwners {
    first_owner: BTreeMap<i64, i64>,
}

impl CategoryOwners {
    pub fn resolve<'a>(links: impl IntoIterator<Item = &'a LegacyLink>) -> Self {
        let first_owner = links
            .into_iter()
            .filter_map(|link| link.category_id.map(|category_id| (category_id, link.user_id)))
            .fold(BTreeMap::new(), |mut owners, (category_id, user_id)| {
                owners.entry(category_id).or_insert(user_id);
                owners
            });
        Self { first_owner }
    }

    /// Owner of the first link seen with this category, if any link had it.
    pub fn first_owner(&self, category_id: i64) -> Option<i64> {
        self.first_owner.get(&category_id).copied()
    }

    pub fn owner_or_fallback(&self, category_id: i64) -> i64 {
        self.first_owner(category_id).unwrap_or(FALLBACK_OWNER_ID)
    }

    /// Number of categories referenced by at least one link.
    pub fn category_count(&self) -> usize {
        self.first_owner.len()
    }
}

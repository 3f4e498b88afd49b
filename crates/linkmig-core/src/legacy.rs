use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLink {
    pub id: i64,
    pub user_id: i64,
    pub created_at: String,
    pub modified_at: String,
    pub title: String,
    pub url: String,
    pub comment: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// Both columns were nullable in the legacy schema; rows missing either are
/// not migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCategory {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl LegacyCategory {
    pub fn complete(&self) -> Option<(i64, &str)> {
        match (self.id, self.name.as_deref()) {
            (Some(id), Some(name)) => Some((id, name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLinkToTag {
    pub id: i64,
    pub link_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySnapshot {
    pub links: Vec<LegacyLink>,
    pub tags: Vec<LegacyTag>,
    pub categories: Vec<LegacyCategory>,
    pub link_to_tag: Vec<LegacyLinkToTag>,
}

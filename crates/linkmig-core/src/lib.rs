pub mod legacy;
pub mod ownership;

pub use legacy::{LegacyCategory, LegacyLink, LegacyLinkToTag, LegacySnapshot, LegacyTag};
pub use ownership::CategoryOwners;

/// Namespace marker that separates category-derived tags from organic ones.
pub const CATEGORY_TAG_PREFIX: &str = "category:";

/// Owner assigned to a category-derived tag when no link references the category.
pub const FALLBACK_OWNER_ID: i64 = 1;

pub fn category_tag_name(category_name: &str) -> String {
    format!("{CATEGORY_TAG_PREFIX}{category_name}")
}

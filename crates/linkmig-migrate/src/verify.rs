//! Post-migration integrity check.
//!
//! Compares the legacy snapshot against what the destination now holds and
//! lists every broken guarantee instead of stopping at the first one.

use crate::MigrationError;
use linkmig_core::{category_tag_name, LegacyLink, LegacySnapshot};
use linkmig_storage::DestinationStore;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DuplicateTagName { name: String },
    MissingLink { link_id: i64 },
    LinkFieldMismatch { link_id: i64, field: &'static str },
    MissingCategory { category_id: i64 },
    MissingCategoryTag { category_id: i64, tag_name: String },
    MissingCategoryAssignment { link_id: i64, tag_id: i64 },
    DuplicateCategoryAssignment { link_id: i64, tag_id: i64 },
    MissingRelation { relation_id: i64 },
    RelationMismatch { relation_id: i64 },
    DanglingAssignment { assignment_id: i64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateTagName { name } => write!(f, "tag name {name:?} is used more than once"),
            Violation::MissingLink { link_id } => write!(f, "link {link_id} was not migrated"),
            Violation::LinkFieldMismatch { link_id, field } => {
                write!(f, "link {link_id} has a different {field}")
            }
            Violation::MissingCategory { category_id } => {
                write!(f, "category {category_id} was not migrated")
            }
            Violation::MissingCategoryTag {
                category_id,
                tag_name,
            } => write!(f, "category {category_id} has no tag named {tag_name:?}"),
            Violation::MissingCategoryAssignment { link_id, tag_id } => {
                write!(f, "link {link_id} is not tagged with its category tag {tag_id}")
            }
            Violation::DuplicateCategoryAssignment { link_id, tag_id } => {
                write!(f, "link {link_id} is tagged with category tag {tag_id} more than once")
            }
            Violation::MissingRelation { relation_id } => {
                write!(f, "link_to_tag row {relation_id} was not migrated")
            }
            Violation::RelationMismatch { relation_id } => {
                write!(f, "link_to_tag row {relation_id} joins a different link or tag")
            }
            Violation::DanglingAssignment { assignment_id } => {
                write!(f, "link_to_tag row {assignment_id} references a missing link or tag")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub links_checked: usize,
    pub categories_checked: usize,
    pub relations_checked: usize,
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn verify_migration(
    snapshot: &LegacySnapshot,
    destination: &DestinationStore,
) -> Result<VerificationReport, MigrationError> {
    let tags = destination.tags()?;
    let links = destination.links()?;
    let categories = destination.categories()?;
    let assignments = destination.link_to_tag()?;

    let mut report = VerificationReport::default();

    let mut tag_ids_by_name: BTreeMap<&str, i64> = BTreeMap::new();
    let mut reported_names = BTreeSet::new();
    for tag in &tags {
        if tag_ids_by_name.insert(tag.name.as_str(), tag.id).is_some()
            && reported_names.insert(tag.name.as_str())
        {
            report.violations.push(Violation::DuplicateTagName {
                name: tag.name.clone(),
            });
        }
    }
    let tag_ids = tags.iter().map(|tag| tag.id).collect::<BTreeSet<_>>();

    let links_by_id = links
        .iter()
        .map(|link| (link.id, link))
        .collect::<BTreeMap<_, _>>();
    for source_link in &snapshot.links {
        report.links_checked += 1;
        match links_by_id.get(&source_link.id) {
            Some(migrated) => {
                for field in changed_link_fields(source_link, migrated) {
                    report.violations.push(Violation::LinkFieldMismatch {
                        link_id: source_link.id,
                        field,
                    });
                }
            }
            None => report.violations.push(Violation::MissingLink {
                link_id: source_link.id,
            }),
        }
    }

    let category_ids = categories
        .iter()
        .filter_map(|category| category.id)
        .collect::<BTreeSet<_>>();
    let mut category_tags = BTreeMap::new();
    for (category_id, name) in snapshot.categories.iter().filter_map(|c| c.complete()) {
        report.categories_checked += 1;
        if !category_ids.contains(&category_id) {
            report
                .violations
                .push(Violation::MissingCategory { category_id });
        }
        let tag_name = category_tag_name(name);
        match tag_ids_by_name.get(tag_name.as_str()) {
            Some(tag_id) => {
                category_tags.insert(category_id, *tag_id);
            }
            None => report.violations.push(Violation::MissingCategoryTag {
                category_id,
                tag_name,
            }),
        }
    }

    let mut pair_counts: BTreeMap<(i64, i64), usize> = BTreeMap::new();
    for assignment in &assignments {
        *pair_counts
            .entry((assignment.link_id, assignment.tag_id))
            .or_default() += 1;
        if !tag_ids.contains(&assignment.tag_id) || !links_by_id.contains_key(&assignment.link_id) {
            report.violations.push(Violation::DanglingAssignment {
                assignment_id: assignment.id,
            });
        }
    }
    for source_link in &snapshot.links {
        let Some(tag_id) = source_link
            .category_id
            .and_then(|category_id| category_tags.get(&category_id).copied())
        else {
            continue;
        };
        let link_id = source_link.id;
        match pair_counts.get(&(link_id, tag_id)).copied().unwrap_or(0) {
            0 => report
                .violations
                .push(Violation::MissingCategoryAssignment { link_id, tag_id }),
            1 => {}
            _ => report
                .violations
                .push(Violation::DuplicateCategoryAssignment { link_id, tag_id }),
        }
    }

    let assignments_by_id = assignments
        .iter()
        .map(|assignment| (assignment.id, assignment))
        .collect::<BTreeMap<_, _>>();
    for relation in &snapshot.link_to_tag {
        report.relations_checked += 1;
        match assignments_by_id.get(&relation.id) {
            Some(stored) if **stored == *relation => {}
            Some(_) => report.violations.push(Violation::RelationMismatch {
                relation_id: relation.id,
            }),
            None => report.violations.push(Violation::MissingRelation {
                relation_id: relation.id,
            }),
        }
    }

    Ok(report)
}

fn changed_link_fields(source: &LegacyLink, migrated: &LegacyLink) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if source.user_id != migrated.user_id {
        fields.push("user_id");
    }
    if source.created_at != migrated.created_at {
        fields.push("created_at");
    }
    if source.modified_at != migrated.modified_at {
        fields.push("modified_at");
    }
    if source.title != migrated.title {
        fields.push("title");
    }
    if source.url != migrated.url {
        fields.push("url");
    }
    if source.comment != migrated.comment {
        fields.push("comment");
    }
    if source.category_id != migrated.category_id {
        fields.push("category_id");
    }
    fields
}

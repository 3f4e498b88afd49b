use crate::dedup::{TagDeduplicator, TagResolution};
use crate::report::MigrationReport;
use crate::MigrationError;
use chrono::Utc;
use linkmig_core::{CategoryOwners, LegacyCategory, LegacyLink, LegacyLinkToTag, LegacyTag};
use linkmig_storage::{DestinationStore, DestinationWriter, InsertOutcome, SourceStore, USERS_TABLE};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Run every step, then roll the destination back.
    pub dry_run: bool,
}

/// Rewrites the legacy category taxonomy of `source` into tags in
/// `destination`.
///
/// Everything runs in one destination transaction: an error at any step
/// leaves the destination as it was before the call. Tags and categories may
/// be migrated again into a destination that already holds them; links and
/// relations may not, and a second run fails on their primary keys.
pub fn run_migration(
    source: &SourceStore,
    destination: &mut DestinationStore,
    options: MigrationOptions,
) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::new(Utc::now(), options.dry_run);
    let writer = destination.begin()?;

    writer.ensure_schema()?;

    let snapshot = source.snapshot()?;
    info!(
        event = "legacy_snapshot_read",
        source = %source.path().display(),
        links = snapshot.links.len(),
        tags = snapshot.tags.len(),
        categories = snapshot.categories.len(),
        relations = snapshot.link_to_tag.len(),
    );

    // Links reference users; tags and categories can migrate without them.
    if !snapshot.links.is_empty() && !writer.table_exists(USERS_TABLE)? {
        return Err(MigrationError::MissingUsersTable);
    }

    let owners = CategoryOwners::resolve(&snapshot.links);
    debug!(event = "category_owners_resolved", categories = owners.category_count());

    migrate_legacy_tags(&writer, &snapshot.tags, &mut report)?;

    let mut dedup = TagDeduplicator::new(&owners);
    migrate_categories(&writer, &snapshot.categories, &mut dedup, &mut report)?;

    migrate_links(
        &writer,
        &snapshot.links,
        &snapshot.link_to_tag,
        &dedup,
        &mut report,
    )?;

    migrate_legacy_assignments(&writer, &snapshot.link_to_tag, &mut report)?;

    report.finished_at = Some(Utc::now());
    if options.dry_run {
        writer.rollback()?;
        info!(event = "migration_rolled_back", reason = "dry_run");
    } else {
        writer.commit()?;
        info!(
            event = "migration_committed",
            links = report.links_migrated,
            derived_tags = report.derived_tags_created,
        );
    }

    Ok(report)
}

fn migrate_legacy_tags(
    writer: &DestinationWriter<'_>,
    tags: &[LegacyTag],
    report: &mut MigrationReport,
) -> Result<(), MigrationError> {
    for tag in tags {
        match writer.insert_legacy_tag(tag)? {
            InsertOutcome::Inserted => report.legacy_tags_inserted += 1,
            InsertOutcome::AlreadyPresent => report.legacy_tags_already_present += 1,
        }
    }
    info!(
        event = "legacy_tags_migrated",
        inserted = report.legacy_tags_inserted,
        already_present = report.legacy_tags_already_present,
    );
    Ok(())
}

fn migrate_categories(
    writer: &DestinationWriter<'_>,
    categories: &[LegacyCategory],
    dedup: &mut TagDeduplicator<'_>,
    report: &mut MigrationReport,
) -> Result<(), MigrationError> {
    for category in categories {
        let Some((category_id, name)) = category.complete() else {
            warn!(
                event = "category_skipped",
                category_id = ?category.id,
                name = ?category.name,
                reason = "missing id or name",
            );
            report.categories_skipped += 1;
            continue;
        };

        match writer.insert_category(category_id, name)? {
            InsertOutcome::Inserted => report.categories_inserted += 1,
            InsertOutcome::AlreadyPresent => report.categories_already_present += 1,
        }

        match dedup.ensure_tag_for_category(writer, category_id, name)? {
            TagResolution::Created(_) => report.derived_tags_created += 1,
            TagResolution::Reused(_) => report.derived_tags_reused += 1,
        }
    }
    info!(
        event = "categories_migrated",
        inserted = report.categories_inserted,
        already_present = report.categories_already_present,
        skipped = report.categories_skipped,
        tags_created = report.derived_tags_created,
        tags_reused = report.derived_tags_reused,
    );
    Ok(())
}

fn migrate_links(
    writer: &DestinationWriter<'_>,
    links: &[LegacyLink],
    legacy_relations: &[LegacyLinkToTag],
    dedup: &TagDeduplicator<'_>,
    report: &mut MigrationReport,
) -> Result<(), MigrationError> {
    // Pairs the legacy relations will restore under their own ids.
    let legacy_pairs = legacy_relations
        .iter()
        .map(|relation| (relation.link_id, relation.tag_id))
        .collect::<BTreeSet<_>>();

    // Derived rows take ids above every id already stored or still to be
    // restored from the legacy relations.
    let mut next_assignment_id = legacy_relations
        .iter()
        .map(|relation| relation.id)
        .fold(writer.max_assignment_id()?, i64::max)
        + 1;

    for link in links {
        let category_id = link
            .category_id
            .ok_or(MigrationError::LinkWithoutCategory { link_id: link.id })?;

        writer.insert_link(link, category_id)?;
        report.links_migrated += 1;

        let Some(tag_id) = dedup.tag_for_category(category_id) else {
            report.derived_assignments_skipped += 1;
            continue;
        };
        if legacy_pairs.contains(&(link.id, tag_id)) {
            debug!(event = "derived_assignment_superseded", link_id = link.id, tag_id);
            report.derived_assignments_superseded += 1;
            continue;
        }
        writer.insert_assignment(&LegacyLinkToTag {
            id: next_assignment_id,
            link_id: link.id,
            tag_id,
        })?;
        next_assignment_id += 1;
        report.derived_assignments_inserted += 1;
    }
    info!(
        event = "links_migrated",
        links = report.links_migrated,
        derived_assignments = report.derived_assignments_inserted,
        superseded = report.derived_assignments_superseded,
    );
    Ok(())
}

fn migrate_legacy_assignments(
    writer: &DestinationWriter<'_>,
    relations: &[LegacyLinkToTag],
    report: &mut MigrationReport,
) -> Result<(), MigrationError> {
    for relation in relations {
        writer.insert_assignment(relation)?;
        report.legacy_assignments_migrated += 1;
    }
    info!(
        event = "legacy_assignments_migrated",
        relations = report.legacy_assignments_migrated,
    );
    Ok(())
}

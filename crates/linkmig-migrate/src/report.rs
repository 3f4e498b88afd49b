use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub legacy_tags_inserted: usize,
    pub legacy_tags_already_present: usize,
    pub categories_inserted: usize,
    pub categories_already_present: usize,
    pub categories_skipped: usize,
    pub derived_tags_created: usize,
    pub derived_tags_reused: usize,
    pub links_migrated: usize,
    pub derived_assignments_inserted: usize,
    pub derived_assignments_skipped: usize,
    pub derived_assignments_superseded: usize,
    pub legacy_assignments_migrated: usize,
}

impl MigrationReport {
    pub fn new(started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            started_at,
            finished_at: None,
            dry_run,
            legacy_tags_inserted: 0,
            legacy_tags_already_present: 0,
            categories_inserted: 0,
            categories_already_present: 0,
            categories_skipped: 0,
            derived_tags_created: 0,
            derived_tags_reused: 0,
            links_migrated: 0,
            derived_assignments_inserted: 0,
            derived_assignments_skipped: 0,
            derived_assignments_superseded: 0,
            legacy_assignments_migrated: 0,
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.dry_run {
            lines.push("dry run: destination left unchanged".to_string());
        }
        lines.push(format!(
            "tags: {} legacy inserted, {} legacy already present",
            self.legacy_tags_inserted, self.legacy_tags_already_present
        ));
        lines.push(format!(
            "categories: {} inserted, {} already present, {} skipped",
            self.categories_inserted, self.categories_already_present, self.categories_skipped
        ));
        lines.push(format!(
            "category tags: {} created, {} reused",
            self.derived_tags_created, self.derived_tags_reused
        ));
        lines.push(format!("links: {} migrated", self.links_migrated));
        lines.push(format!(
            "assignments: {} derived, {} legacy, {} derived superseded by legacy, {} without tag",
            self.derived_assignments_inserted,
            self.legacy_assignments_migrated,
            self.derived_assignments_superseded,
            self.derived_assignments_skipped
        ));
        if let Some(finished_at) = self.finished_at {
            let elapsed = finished_at - self.started_at;
            lines.push(format!("finished in {} ms", elapsed.num_milliseconds()));
        }
        lines
    }
}

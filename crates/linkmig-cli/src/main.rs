use anyhow::{bail, Context, Result};
use clap::Parser;
use linkmig_migrate::{
    run_migration, verify_migration, MigrationOptions, MigrationReport, VerificationReport,
};
use linkmig_storage::{DestinationStore, SourceStore};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SOURCE_DB_PATH: &str = "dbscripts/db-export/db.sqlite";
const DESTINATION_DB_PATH: &str = "db/db.sqlite";

#[derive(Parser, Debug)]
#[command(name = "link-migrate")]
#[command(about = "Convert legacy link categories into tags", long_about = None)]
struct Args {
    /// Exported legacy database, opened read-only
    #[arg(long, env = "LINKMIG_SOURCE_DB", default_value = SOURCE_DB_PATH)]
    source: PathBuf,
    /// CMS database receiving tags, categories, links and assignments
    #[arg(long, env = "LINKMIG_DEST_DB", default_value = DESTINATION_DB_PATH)]
    destination: PathBuf,
    /// Run the whole migration, then roll it back
    #[arg(long)]
    dry_run: bool,
    /// Check the destination against the source after migrating
    #[arg(long, conflicts_with = "dry_run")]
    verify: bool,
    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
    #[arg(long)]
    debug: bool,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    migration: &'a MigrationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification: Option<&'a VerificationReport>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug || env_true("LINKMIG_DEBUG"));
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let source = SourceStore::open(&args.source)
        .with_context(|| format!("failed to open source database {}", args.source.display()))?;
    if !args.destination.is_file() {
        bail!(
            "destination database not found at {}",
            args.destination.display()
        );
    }
    let mut destination = DestinationStore::open(&args.destination).with_context(|| {
        format!(
            "failed to open destination database {}",
            args.destination.display()
        )
    })?;

    info!(
        event = "migration_start",
        source = %args.source.display(),
        destination = %args.destination.display(),
        dry_run = args.dry_run,
    );
    let report = run_migration(
        &source,
        &mut destination,
        MigrationOptions {
            dry_run: args.dry_run,
        },
    )
    .context("link taxonomy migration failed")?;
    for line in report.summary_lines() {
        info!(event = "migration_summary", "{line}");
    }

    let verification = if args.verify {
        let snapshot = source
            .snapshot()
            .context("failed to re-read source for verification")?;
        Some(verify_migration(&snapshot, &destination).context("verification failed to run")?)
    } else {
        None
    };

    if args.json {
        let output = RunOutput {
            migration: &report,
            verification: verification.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if let Some(verification) = verification {
        if !verification.is_clean() {
            for violation in &verification.violations {
                error!(event = "verification_violation", "{violation}");
            }
            bail!(
                "verification found {} violation(s)",
                verification.violations.len()
            );
        }
        info!(
            event = "verification_passed",
            links = verification.links_checked,
            categories = verification.categories_checked,
            relations = verification.relations_checked,
        );
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else if let Ok(level) = std::env::var("LINKMIG_LOG_LEVEL") {
        level
    } else {
        "info".to_string()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging already initialized");
    }
}

fn env_true(key: &str) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

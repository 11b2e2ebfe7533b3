//! `projsync manifests` — list what would be read, offline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use projsync_core::{manifest, Manifest};

use super::{load_config, RootsArgs};

/// Arguments for `projsync manifests`.
#[derive(Args, Debug)]
pub struct ManifestsArgs {
    #[command(flatten)]
    pub roots: RootsArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ManifestsJson {
    manifests: Vec<Manifest>,
    failures: Vec<FailureJson>,
}

#[derive(Serialize)]
struct FailureJson {
    path: PathBuf,
    error: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "description")]
    description: String,
}

impl ManifestsArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config()?;
        let discovered = manifest::discover(&self.roots.roots, &config.manifest_names())
            .context("manifest discovery failed")?;
        let mut loaded = manifest::load_all(&discovered.paths);
        let mut failures = discovered.failures;
        failures.append(&mut loaded.failures);
        loaded.failures = failures;

        if self.json {
            let payload = ManifestsJson {
                manifests: loaded.manifests,
                failures: loaded
                    .failures
                    .into_iter()
                    .map(|f| FailureJson { path: f.path, error: f.error.to_string() })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize manifests JSON")?
            );
            return Ok(());
        }

        if loaded.manifests.is_empty() && loaded.failures.is_empty() {
            println!("No manifests found.");
            return Ok(());
        }

        for m in &loaded.manifests {
            println!("{} ({} entries)", m.path.display().to_string().bold(), m.entries.len());
            if m.entries.is_empty() {
                continue;
            }
            let rows: Vec<EntryRow> = m
                .entries
                .iter()
                .map(|e| EntryRow {
                    title: e.title.to_string(),
                    source: e.source.display().to_string(),
                    description: e.description.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        for f in &loaded.failures {
            println!("  {}  {}: {}", "!".yellow(), f.path.display(), f.error);
        }
        Ok(())
    }
}

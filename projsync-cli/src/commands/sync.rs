//! `projsync sync` — push declared projects and prune dangling ones.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use projsync_sync::{pipeline, RunOutcome};

use super::{connect, PolicyArgs, RemoteArgs, RootsArgs};
use crate::commands::plan::print_rejections;

/// Arguments for `projsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub roots: RootsArgs,

    #[command(flatten)]
    pub remote: RemoteArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Report what would be pushed or deleted without calling the catalog.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete catalog projects you manage that no manifest declares anymore.
    #[arg(long)]
    pub delete_missing: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let session = connect(&self.remote)?;
        let mut policy = self.policy.policy();
        policy.dry_run = self.dry_run;
        policy.delete_missing = self.delete_missing;

        let request = session.request(&self.roots, policy);
        let outcome = pipeline::block_on(pipeline::run(&request, &session.capabilities))?
            .context("sync failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).context("failed to serialize sync JSON")?
            );
        } else {
            print_summary(&outcome, self.dry_run);
        }

        let report = &outcome.report;
        if report.has_failures() {
            anyhow::bail!(
                "{} push(es) and {} delete(s) failed",
                report.push_errors.len(),
                report.delete_errors.len()
            );
        }
        Ok(())
    }
}

fn print_summary(outcome: &RunOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let report = &outcome.report;
    let reconciliation = &outcome.plan.reconciliation;

    for skipped in &outcome.plan.skipped_manifests {
        println!("  {}  {}: {}", "!".yellow(), skipped.path.display(), skipped.error);
    }

    print_rejections(&reconciliation.rejected);

    if dry_run {
        for accepted in &reconciliation.accepted {
            println!("  ~  push {}", accepted.project.title);
        }
        if report.skipped_deletes > 0 {
            for title in &reconciliation.dangling {
                println!("  ~  delete {title}");
            }
        }
    }

    for failure in &report.push_errors {
        println!("  {}  push {}: {}", "✗".red(), failure.title, failure.error);
    }
    for failure in &report.delete_errors {
        println!("  {}  delete {}: {}", "✗".red(), failure.title, failure.error);
    }

    let mark = if report.has_failures() { "✗".red() } else { "✓".green() };
    let would = if dry_run {
        format!(
            "; {} would be pushed, {} would be deleted",
            report.skipped_pushes, report.skipped_deletes
        )
    } else {
        String::new()
    };
    println!(
        "{prefix}{mark} {} pushed, {} deleted, {} rejected, {} failed{would} ({} ms)",
        report.pushed,
        report.deleted,
        reconciliation.rejected.len(),
        report.push_errors.len() + report.delete_errors.len(),
        report.duration_ms,
    );

    if report.retained_dangling > 0 {
        println!(
            "{} project(s) you manage are no longer declared; run with --delete-missing to remove them.",
            report.retained_dangling
        );
    }
}

//! `projsync plan` — reconcile without mutating the catalog.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use projsync_sync::{pipeline, PlanOutcome, Rejected};

use super::{connect, PolicyArgs, RemoteArgs, RootsArgs};

/// Arguments for `projsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub roots: RootsArgs,

    #[command(flatten)]
    pub remote: RemoteArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let session = connect(&self.remote)?;
        let request = session.request(&self.roots, self.policy.policy());
        let outcome = pipeline::block_on(pipeline::plan(&request, &session.capabilities))?
            .context("plan failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).context("failed to serialize plan JSON")?
            );
            return Ok(());
        }

        print_table(&outcome);
        Ok(())
    }
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "visibility")]
    visibility: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_table(outcome: &PlanOutcome) {
    let reconciliation = &outcome.reconciliation;
    println!(
        "projsync v{} | {} manifests | {} candidates | {} accepted | {} rejected | {} dangling",
        env!("CARGO_PKG_VERSION"),
        outcome.manifests.len(),
        outcome.candidates,
        reconciliation.accepted.len(),
        reconciliation.rejected.len(),
        reconciliation.dangling.len(),
    );

    for skipped in &outcome.skipped_manifests {
        println!("  {}  {}: {}", "!".yellow(), skipped.path.display(), skipped.error);
    }

    let mut rows: Vec<PlanRow> = Vec::new();
    for accepted in &reconciliation.accepted {
        rows.push(PlanRow {
            title: accepted.project.title.to_string(),
            action: "PUSH".green().to_string(),
            visibility: accepted.project.visibility.to_string(),
            detail: accepted
                .warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        });
    }
    for rejected in &reconciliation.rejected {
        rows.push(PlanRow {
            title: rejected.project.title.to_string(),
            action: "REJECT".red().to_string(),
            visibility: rejected.project.visibility.to_string(),
            detail: rejected.reason.to_string(),
        });
    }
    for title in &reconciliation.dangling {
        rows.push(PlanRow {
            title: title.to_string(),
            action: "DANGLING".yellow().to_string(),
            visibility: "-".to_string(),
            detail: "managed by you, no longer declared".to_string(),
        });
    }

    if rows.is_empty() {
        println!("Nothing to do.");
        return;
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

/// One line per rejection, for the non-tabular sync summary.
pub(crate) fn print_rejections(rejected: &[Rejected]) {
    for r in rejected {
        println!(
            "  {}  {} ({}): {}",
            "✗".yellow(),
            r.project.title,
            r.project.origin.display(),
            r.reason
        );
    }
}

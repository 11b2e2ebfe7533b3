//! Shared run entrypoints used by the CLI.
//!
//! ```text
//! discover → load (per-file isolation) → aggregate → fetch ownership (once)
//!          → reconcile → execute
//! ```
//!
//! [`plan`] stops after reconciliation and never mutates the catalog.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use projsync_core::{manifest, OwnershipMap, ProjectTitle, PusherId, ReconciliationPolicy};
use projsync_visibility::ResolveVisibility;

use crate::aggregate::aggregate;
use crate::catalog::Catalog;
use crate::error::SyncError;
use crate::events::{SyncEvent, SyncEvents};
use crate::execute::{execute, SyncReport};
use crate::reconcile::{reconcile, Reconciliation};

/// What to sync and how.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Directories (or individual manifest files) to search.
    pub roots: Vec<PathBuf>,
    /// File names recognised as manifests while walking `roots`.
    pub manifest_names: Vec<String>,
    pub pusher: PusherId,
    pub policy: ReconciliationPolicy,
    /// Bound on concurrent probes and catalog calls.
    pub concurrency: usize,
}

/// External collaborators for a run.
#[derive(Clone)]
pub struct Capabilities {
    pub catalog: Arc<dyn Catalog>,
    pub resolver: Arc<dyn ResolveVisibility>,
    pub events: Arc<dyn SyncEvents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedManifest {
    pub path: PathBuf,
    pub error: String,
}

/// Everything known before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOutcome {
    /// Manifests that loaded, in discovery order.
    pub manifests: Vec<PathBuf>,
    pub skipped_manifests: Vec<SkippedManifest>,
    pub candidates: usize,
    pub reconciliation: Reconciliation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub plan: PlanOutcome,
    pub report: SyncReport,
}

/// Reconcile without touching the catalog beyond the ownership fetch.
pub async fn plan(request: &SyncRequest, caps: &Capabilities) -> Result<PlanOutcome, SyncError> {
    let events = caps.events.as_ref();

    let discovered = manifest::discover(&request.roots, &request.manifest_names)?;
    let loaded = manifest::load_all(&discovered.paths);
    let skipped_manifests: Vec<SkippedManifest> = discovered
        .failures
        .into_iter()
        .chain(loaded.failures)
        .map(|f| {
            let skipped = SkippedManifest { path: f.path, error: f.error.to_string() };
            events.emit(&SyncEvent::ManifestSkipped {
                path: skipped.path.clone(),
                error: skipped.error.clone(),
            });
            skipped
        })
        .collect();

    let candidates = aggregate(
        &loaded.manifests,
        Arc::clone(&caps.resolver),
        request.concurrency,
        events,
    )
    .await?;

    let titles: BTreeSet<ProjectTitle> = candidates.iter().map(|c| c.title.clone()).collect();
    let ownership = fetch_ownership(Arc::clone(&caps.catalog), titles).await?;

    let reconciliation = reconcile(
        &request.pusher,
        &candidates,
        &ownership,
        &request.policy,
        events,
    );

    Ok(PlanOutcome {
        manifests: loaded.manifests.iter().map(|m| m.path.clone()).collect(),
        skipped_manifests,
        candidates: candidates.len(),
        reconciliation,
    })
}

/// Plan, then push and delete.
pub async fn run(request: &SyncRequest, caps: &Capabilities) -> Result<RunOutcome, SyncError> {
    let plan = plan(request, caps).await?;
    let report = execute(
        &request.pusher,
        &plan.reconciliation.accepted_projects(),
        &plan.reconciliation.dangling,
        &request.policy,
        Arc::clone(&caps.catalog),
        request.concurrency,
        caps.events.as_ref(),
    )
    .await?;
    Ok(RunOutcome { plan, report })
}

async fn fetch_ownership(
    catalog: Arc<dyn Catalog>,
    titles: BTreeSet<ProjectTitle>,
) -> Result<OwnershipMap, SyncError> {
    let ownership = tokio::task::spawn_blocking(move || catalog.fetch_ownership(&titles)).await??;
    tracing::debug!("ownership snapshot has {} entries", ownership.len());
    Ok(ownership)
}

/// Drive `future` to completion on a fresh multi-threaded runtime.
///
/// For synchronous callers such as the CLI.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, SyncError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SyncError::Runtime)?;
    Ok(runtime.block_on(future))
}

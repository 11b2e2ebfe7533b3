//! Manifest aggregation: manifests → ordered candidate projects.
//!
//! Candidate order is manifest order, then entry order within a manifest.
//! Reconciliation relies on that order for first-seen-wins, so visibility
//! results are slotted back by position no matter when their probe finishes.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use projsync_core::{Manifest, Project, Visibility};
use projsync_visibility::ResolveVisibility;

use crate::error::SyncError;
use crate::events::{SyncEvent, SyncEvents};
use crate::pool::map_blocking;

/// Flatten `manifests` into candidates, resolving each source's visibility.
///
/// Each distinct source directory is resolved once, with at most
/// `concurrency` resolutions in flight. A failed resolution yields
/// [`Visibility::Unresolved`] rather than an error.
pub async fn aggregate(
    manifests: &[Manifest],
    resolver: Arc<dyn ResolveVisibility>,
    concurrency: usize,
    events: &dyn SyncEvents,
) -> Result<Vec<Project>, SyncError> {
    let sources: Vec<PathBuf> = manifests
        .iter()
        .flat_map(|m| m.entries.iter().map(|e| e.source.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let resolved = map_blocking(sources.clone(), concurrency, move |source| {
        match resolver.resolve(&source) {
            Ok(is_private) => Visibility::from_private(is_private),
            Err(e) => Visibility::Unresolved { reason: e.to_string() },
        }
    })
    .await?;
    let visibility: HashMap<PathBuf, Visibility> = sources
        .into_iter()
        .zip(resolved)
        .map(|(source, vis)| {
            let vis = vis.unwrap_or_else(|reason| Visibility::Unresolved { reason });
            (source, vis)
        })
        .collect();

    let mut candidates = Vec::new();
    for manifest in manifests {
        for entry in &manifest.entries {
            let vis = visibility
                .get(&entry.source)
                .cloned()
                .unwrap_or_else(|| Visibility::Unresolved {
                    reason: "source was not resolved".to_string(),
                });
            candidates.push(Project::from_entry(entry, manifest.path.clone(), vis));
        }
    }

    events.emit(&SyncEvent::CandidatesCollected {
        manifests: manifests.len(),
        candidates: candidates.len(),
    });
    Ok(candidates)
}

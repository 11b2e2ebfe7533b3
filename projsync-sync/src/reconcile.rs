//! Reconciliation: classify candidates against the ownership snapshot.
//!
//! Each candidate is checked in candidate-sequence order, and the checks run in
//! a fixed order; the first failing check decides the rejection reason:
//!
//! 1. Ownership — managed by another pusher?
//! 2. Visibility — private, or unresolved?
//! 3. Duplicate — title already accepted from an earlier candidate?
//!
//! Duplicates are first-seen-wins. A later candidate never displaces an
//! earlier accepted one, whatever its contents.
//!
//! Dangling titles are computed from *all* candidate titles, accepted or not:
//! a project that is declared but misconfigured locally is never deleted.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use projsync_core::{OwnershipMap, Project, ProjectTitle, PusherId, ReconciliationPolicy, Visibility};

use crate::events::{SyncEvent, SyncEvents};

/// Annotation on a project accepted only because the policy allowed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The project is managed by another pusher and will be overwritten.
    OverwritesOwner { owner: PusherId },
    /// The project's source repository is private.
    PrivateSource,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OverwritesOwner { owner } => write!(f, "will overwrite project managed by '{owner}'"),
            Warning::PrivateSource => write!(f, "source repository is private"),
        }
    }
}

/// Why a candidate will not be pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    ForeignOwnership { owner: PusherId },
    PrivateSource,
    /// The visibility probe failed, so privacy could not be ruled out.
    VisibilityProbe { reason: String },
    DuplicateTitle { first_origin: PathBuf },
}

impl RejectReason {
    /// Stable machine-readable key.
    pub fn key(&self) -> &'static str {
        match self {
            RejectReason::ForeignOwnership { .. } => "foreign_ownership",
            RejectReason::PrivateSource => "private_source",
            RejectReason::VisibilityProbe { .. } => "visibility_probe",
            RejectReason::DuplicateTitle { .. } => "duplicate_title",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::ForeignOwnership { owner } => {
                write!(f, "managed by '{owner}' (use --allow-different-owner to overwrite)")
            }
            RejectReason::PrivateSource => {
                write!(f, "source repository is private (use --allow-private to push anyway)")
            }
            RejectReason::VisibilityProbe { reason } => {
                write!(f, "could not determine source visibility: {reason}")
            }
            RejectReason::DuplicateTitle { first_origin } => {
                write!(f, "title already declared in {}", first_origin.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accepted {
    pub project: Project,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    pub project: Project,
    pub reason: RejectReason,
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Projects to push, in first-seen candidate order.
    pub accepted: Vec<Accepted>,
    pub rejected: Vec<Rejected>,
    /// Titles managed by this pusher remotely but declared by no candidate.
    pub dangling: BTreeSet<ProjectTitle>,
}

impl Reconciliation {
    pub fn accepted_projects(&self) -> Vec<Project> {
        self.accepted.iter().map(|a| a.project.clone()).collect()
    }
}

/// Classify `candidates` and compute the dangling set.
///
/// Pure apart from `events`: the same inputs always give the same result.
pub fn reconcile(
    pusher: &PusherId,
    candidates: &[Project],
    ownership: &OwnershipMap,
    policy: &ReconciliationPolicy,
    events: &dyn SyncEvents,
) -> Reconciliation {
    let mut result = Reconciliation::default();
    // title → index into result.accepted
    let mut seen: HashMap<&ProjectTitle, usize> = HashMap::new();

    for candidate in candidates {
        match classify(pusher, candidate, ownership, policy, &seen, &result.accepted) {
            Ok(warnings) => {
                events.emit(&SyncEvent::Accepted {
                    title: candidate.title.clone(),
                    origin: candidate.origin.clone(),
                    warnings: warnings.clone(),
                });
                seen.insert(&candidate.title, result.accepted.len());
                result.accepted.push(Accepted { project: candidate.clone(), warnings });
            }
            Err(reason) => {
                events.emit(&SyncEvent::Rejected {
                    title: candidate.title.clone(),
                    origin: candidate.origin.clone(),
                    reason: reason.clone(),
                });
                result.rejected.push(Rejected { project: candidate.clone(), reason });
            }
        }
    }

    result.dangling = dangling(pusher, ownership, candidates.iter().map(|c| &c.title));
    result
}

fn classify(
    pusher: &PusherId,
    candidate: &Project,
    ownership: &OwnershipMap,
    policy: &ReconciliationPolicy,
    seen: &HashMap<&ProjectTitle, usize>,
    accepted: &[Accepted],
) -> Result<Vec<Warning>, RejectReason> {
    let mut warnings = Vec::new();

    if let Some(owner) = ownership.get(&candidate.title) {
        if owner != pusher {
            if !policy.allow_different_owner {
                return Err(RejectReason::ForeignOwnership { owner: owner.clone() });
            }
            warnings.push(Warning::OverwritesOwner { owner: owner.clone() });
        }
    }

    match &candidate.visibility {
        Visibility::Public => {}
        Visibility::Private if policy.allow_private => warnings.push(Warning::PrivateSource),
        Visibility::Private => return Err(RejectReason::PrivateSource),
        Visibility::Unresolved { reason } => {
            return Err(RejectReason::VisibilityProbe { reason: reason.clone() });
        }
    }

    if let Some(&idx) = seen.get(&candidate.title) {
        return Err(RejectReason::DuplicateTitle {
            first_origin: accepted[idx].project.origin.clone(),
        });
    }

    Ok(warnings)
}

/// Titles managed by `pusher` in `ownership` that are absent from `declared`.
pub fn dangling<'a>(
    pusher: &PusherId,
    ownership: &OwnershipMap,
    declared: impl IntoIterator<Item = &'a ProjectTitle>,
) -> BTreeSet<ProjectTitle> {
    let declared: BTreeSet<&ProjectTitle> = declared.into_iter().collect();
    ownership
        .iter()
        .filter(|(title, owner)| *owner == pusher && !declared.contains(title))
        .map(|(title, _)| title.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

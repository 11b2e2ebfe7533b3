//! Remote catalog capability.

use std::collections::BTreeSet;

use projsync_core::{OwnershipMap, Project, ProjectTitle, PusherId};

use crate::error::CatalogError;

/// The remote catalog as seen by the sync engine.
///
/// Every mutating call reports success explicitly: `Ok(true)` means the
/// catalog applied it, `Ok(false)` means it answered but declined. Callers
/// never treat a missing error as success.
pub trait Catalog: Send + Sync {
    /// Ownership for `titles`, plus every title managed by the caller.
    fn fetch_ownership(&self, titles: &BTreeSet<ProjectTitle>) -> Result<OwnershipMap, CatalogError>;

    /// Create or fully replace `project`, recording `pusher` as its manager.
    fn push(&self, pusher: &PusherId, project: &Project) -> Result<bool, CatalogError>;

    fn delete(&self, title: &ProjectTitle) -> Result<bool, CatalogError>;
}

//! Domain types shared by every projsync crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The unique key of a project in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectTitle(pub String);

impl ProjectTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectTitle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectTitle {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The identity on whose behalf projects are pushed and deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PusherId(pub String);

impl fmt::Display for PusherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PusherId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PusherId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Remote snapshot: project title → pusher currently managing it.
pub type OwnershipMap = BTreeMap<ProjectTitle, PusherId>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Hosting visibility of a project's source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    /// The probe failed; the project cannot be validated this run.
    Unresolved { reason: String },
}

impl Visibility {
    pub fn from_private(is_private: bool) -> Self {
        if is_private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Unresolved { .. } => write!(f, "unresolved"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One entry of a manifest, before visibility is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub title: ProjectTitle,
    pub description: String,
    /// Source directory, already resolved against the manifest's directory.
    pub source: PathBuf,
}

/// A parsed manifest file. Entries keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

/// A candidate project: a manifest entry stamped with its origin and visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub title: ProjectTitle,
    pub description: String,
    pub source: PathBuf,
    /// Manifest the project was declared in.
    pub origin: PathBuf,
    pub visibility: Visibility,
}

impl Project {
    pub fn from_entry(entry: &ManifestEntry, origin: PathBuf, visibility: Visibility) -> Self {
        Self {
            title: entry.title.clone(),
            description: entry.description.clone(),
            source: entry.source.clone(),
            origin,
            visibility,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.visibility, Visibility::Private)
    }
}

/// Flags controlling how candidates are classified and how the sync is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPolicy {
    /// Accept projects whose source repository is private.
    pub allow_private: bool,
    /// Overwrite projects currently managed by another pusher.
    pub allow_different_owner: bool,
    /// Log push/delete operations instead of issuing them.
    pub dry_run: bool,
    /// Delete remote projects managed by this pusher that no manifest declares.
    pub delete_missing: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

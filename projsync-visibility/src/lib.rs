//! Source repository visibility for `projsync`.
//!
//! `VisibilityResolver::resolve(source)` answers "is this project's source
//! privately hosted?":
//!
//! 1. No enclosing git repository, no remote, or a local-only remote → public.
//!    Absence of evidence is not privacy; nothing is sent over the network.
//! 2. Otherwise the remote is rewritten to HTTPS and its upload-pack discovery
//!    endpoint is probed once: `401` → private, `200` → public.
//! 3. Any other status is an error. Callers must not pick a default for it.
//!
//! The asymmetry between (1) and (3) is intentional; keep both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub mod probe;
pub mod remote;

pub use probe::HttpProbe;
pub use remote::{normalize_remote_url, upload_pack_endpoint, GitRemotes};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from visibility resolution. Any of these invalidates the project
/// for the current run.
#[derive(Debug, Error)]
pub enum VisibilityError {
    #[error("source {path} is not a directory")]
    SourceMissing { path: PathBuf },

    #[error("git error at {path}: {source}")]
    Git {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("cannot interpret git remote URL '{url}'")]
    InvalidRemote { url: String },

    #[error("unexpected HTTP status {status} while probing {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("probe of {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Version-control query: the remote URL configured for `dir`, if any.
pub trait RemoteLookup: Send + Sync {
    fn remote_url(&self, dir: &Path) -> Result<Option<String>, VisibilityError>;
}

/// HTTP query: the status code returned for `url`.
pub trait StatusProbe: Send + Sync {
    fn status(&self, url: &str) -> Result<u16, VisibilityError>;
}

/// Anything able to classify a source directory as private (`true`) or not.
pub trait ResolveVisibility: Send + Sync {
    fn resolve(&self, source: &Path) -> Result<bool, VisibilityError>;
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Combines a [`RemoteLookup`] and a [`StatusProbe`].
#[derive(Debug, Clone)]
pub struct VisibilityResolver<L, P> {
    lookup: L,
    probe: P,
}

/// The production resolver: libgit2 + ureq.
pub type GitVisibility = VisibilityResolver<GitRemotes, HttpProbe>;

impl GitVisibility {
    pub fn with_timeout(timeout: Duration) -> Self {
        VisibilityResolver::new(GitRemotes, HttpProbe::new(timeout))
    }
}

impl<L: RemoteLookup, P: StatusProbe> VisibilityResolver<L, P> {
    pub fn new(lookup: L, probe: P) -> Self {
        Self { lookup, probe }
    }
}

impl<L: RemoteLookup, P: StatusProbe> ResolveVisibility for VisibilityResolver<L, P> {
    fn resolve(&self, source: &Path) -> Result<bool, VisibilityError> {
        if !source.is_dir() {
            return Err(VisibilityError::SourceMissing { path: source.to_path_buf() });
        }

        let Some(raw) = self.lookup.remote_url(source)? else {
            tracing::debug!("{} has no git remote; treating as public", source.display());
            return Ok(false);
        };
        let Some(https) = normalize_remote_url(&raw)? else {
            tracing::debug!("{} has local remote '{raw}'; treating as public", source.display());
            return Ok(false);
        };

        let endpoint = upload_pack_endpoint(&https);
        match self.probe.status(&endpoint)? {
            401 => Ok(true),
            200 => Ok(false),
            status => Err(VisibilityError::UnexpectedStatus { url: endpoint, status }),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

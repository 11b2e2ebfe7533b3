pub mod manifests;
pub mod plan;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use projsync_core::config::{self, Config};
use projsync_core::{identity, PusherId, ReconciliationPolicy};
use projsync_sync::{Capabilities, SyncRequest, TracingEvents};
use projsync_visibility::GitVisibility;

use crate::catalog::HttpCatalog;

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

/// Where to look for manifests.
#[derive(Args, Debug)]
pub struct RootsArgs {
    /// Directories to search (or manifest files to read directly).
    #[arg(value_name = "ROOTS", default_value = ".")]
    pub roots: Vec<PathBuf>,
}

/// How to reach the catalog. Flags win over env vars, env vars over the config file.
#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Base URL of the project catalog.
    #[arg(long, env = "PROJSYNC_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Bearer token for the catalog; also identifies the pusher.
    #[arg(long, env = "PROJSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum concurrent probes and catalog calls.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Relaxations of the default acceptance rules.
#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Push projects whose source repository is private.
    #[arg(long)]
    pub allow_private: bool,

    /// Overwrite projects managed by another pusher.
    #[arg(long)]
    pub allow_different_owner: bool,
}

impl PolicyArgs {
    pub fn policy(&self) -> ReconciliationPolicy {
        ReconciliationPolicy {
            allow_private: self.allow_private,
            allow_different_owner: self.allow_different_owner,
            ..ReconciliationPolicy::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

/// Everything a catalog-facing command needs.
pub struct Session {
    pub pusher: PusherId,
    pub capabilities: Capabilities,
    pub concurrency: usize,
    pub manifest_names: Vec<String>,
}

impl Session {
    pub fn request(&self, roots: &RootsArgs, policy: ReconciliationPolicy) -> SyncRequest {
        SyncRequest {
            roots: roots.roots.clone(),
            manifest_names: self.manifest_names.clone(),
            pusher: self.pusher.clone(),
            policy,
            concurrency: self.concurrency,
        }
    }
}

pub fn load_config() -> Result<Config> {
    config::load().context("failed to load ~/.projsync/config.yaml")
}

/// Resolve identity, catalog and resolver from flags, env and config.
///
/// Identity comes first so a missing or unusable token is reported before
/// anything else.
pub fn connect(remote: &RemoteArgs) -> Result<Session> {
    let config = load_config()?;

    let token = remote.token.clone().or_else(|| config.token.clone());
    let pusher = identity::pusher_from_token(token.as_deref())?;
    let token = token.unwrap_or_default();

    let url = remote
        .catalog_url
        .clone()
        .or_else(|| config.catalog_url.clone())
        .context("no catalog URL configured; pass --catalog-url or set PROJSYNC_CATALOG_URL")?;

    let timeout = Duration::from_secs(config.timeout_secs());
    let catalog = HttpCatalog::new(&url, &token, timeout)?;
    let concurrency = remote.concurrency.unwrap_or_else(|| config.concurrency()).max(1);

    tracing::debug!(pusher = %pusher, catalog = %url, concurrency, "session ready");

    Ok(Session {
        pusher,
        capabilities: Capabilities {
            catalog: Arc::new(catalog),
            resolver: Arc::new(GitVisibility::with_timeout(timeout)),
            events: Arc::new(TracingEvents),
        },
        concurrency,
        manifest_names: config.manifest_names(),
    })
}

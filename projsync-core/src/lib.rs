//! projsync core library — domain types, manifest loading, config, identity.
//!
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`ManifestError`], [`ConfigError`], [`IdentityError`]
//! - [`manifest`] — discover / parse / load manifest files
//! - [`config`] — `~/.projsync/config.yaml`
//! - [`identity`] — pusher identity from the catalog token

pub mod config;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod types;

pub use error::{ConfigError, IdentityError, ManifestError};
pub use types::{
    Manifest, ManifestEntry, OwnershipMap, Project, ProjectTitle, PusherId, ReconciliationPolicy,
    Visibility,
};

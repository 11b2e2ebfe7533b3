//! Error types for projsync-sync.

use thiserror::Error;

use projsync_core::ManifestError;

/// A remote catalog call could not be completed.
///
/// A call that completed but was declined by the catalog is not an error; the
/// [`Catalog`](crate::Catalog) methods report that as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {message}")]
    Transport { message: String },

    #[error("catalog answered with HTTP {status}")]
    Status { status: u16 },

    #[error("catalog response could not be decoded: {message}")]
    Decode { message: String },
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Manifest discovery failed (for example a root that does not exist).
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// The ownership snapshot could not be fetched; nothing was pushed or deleted.
    #[error("failed to fetch ownership snapshot: {0}")]
    Ownership(#[from] CatalogError),

    #[error("could not start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("worker pool closed unexpectedly")]
    PoolClosed,
}

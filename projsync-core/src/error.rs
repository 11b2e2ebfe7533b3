//! Error types for projsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering or loading manifest files.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O failure with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Valid YAML that does not describe a title → entry mapping.
    #[error("malformed manifest at {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Errors raised while loading `~/.projsync/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.projsync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// The pusher identity could not be derived from the credential.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no catalog token configured; pass --token or set PROJSYNC_TOKEN")]
    MissingToken,

    #[error("token is not a JWT (expected three dot-separated segments)")]
    MalformedToken,

    #[error("token payload could not be decoded: {0}")]
    Decode(String),

    #[error("token payload has no 'pusher' or 'sub' claim")]
    MissingClaim,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}

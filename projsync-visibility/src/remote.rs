//! Git remote lookup and remote URL normalisation.

use std::path::Path;

use git2::{ErrorCode, Repository};
use url::Url;

use crate::{RemoteLookup, VisibilityError};

/// [`RemoteLookup`] backed by libgit2.
///
/// Prefers the `origin` remote; otherwise takes the first remote by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRemotes;

impl RemoteLookup for GitRemotes {
    fn remote_url(&self, dir: &Path) -> Result<Option<String>, VisibilityError> {
        let git_err = |source: git2::Error| VisibilityError::Git {
            path: dir.to_path_buf(),
            source,
        };

        let repo = match Repository::discover(dir) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(git_err(e)),
        };

        let remote = match repo.find_remote("origin") {
            Ok(remote) => remote,
            Err(e) if e.code() == ErrorCode::NotFound => {
                let mut names: Vec<String> = repo
                    .remotes()
                    .map_err(git_err)?
                    .iter()
                    .flatten()
                    .map(str::to_owned)
                    .collect();
                names.sort();
                match names.first() {
                    Some(name) => repo.find_remote(name).map_err(git_err)?,
                    None => return Ok(None),
                }
            }
            Err(e) => return Err(git_err(e)),
        };

        Ok(remote.url().map(str::to_owned))
    }
}

/// Rewrite a git remote URL to the HTTPS form used for probing.
///
/// | input | output |
/// |---|---|
/// | `git@host:org/repo.git` | `https://host/org/repo.git` |
/// | `ssh://git@host:2222/org/repo` | `https://host/org/repo` |
/// | `git://host/org/repo` | `https://host/org/repo` |
/// | `http://user:pw@host/org/repo/` | `https://host/org/repo` |
///
/// Local remotes (`file://`, plain paths) return `Ok(None)`: there is nothing
/// to probe.
pub fn normalize_remote_url(raw: &str) -> Result<Option<Url>, VisibilityError> {
    let raw = raw.trim();
    let invalid = || VisibilityError::InvalidRemote { url: raw.to_string() };

    if raw.is_empty() || raw.starts_with('/') || raw.starts_with('.') {
        return Ok(None);
    }

    if !raw.contains("://") {
        // scp-like syntax: [user@]host:path
        let Some((authority, path)) = raw.split_once(':') else {
            return Ok(None);
        };
        let host = authority.rsplit('@').next().unwrap_or(authority);
        // `C:/repo` is a drive letter, not a host.
        if host.is_empty() || host.len() == 1 || authority.contains('/') {
            return Ok(None);
        }
        let path = path.trim_start_matches('/').trim_end_matches('/');
        return Url::parse(&format!("https://{host}/{path}"))
            .map(Some)
            .map_err(|_| invalid());
    }

    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    let keep_port = match parsed.scheme() {
        "file" => return Ok(None),
        "http" | "https" => true,
        "ssh" | "git" | "git+ssh" | "ssh+git" => false,
        _ => return Err(invalid()),
    };
    let host = parsed.host_str().ok_or_else(invalid)?;
    let authority = match (keep_port, parsed.port()) {
        (true, Some(port)) => format!("{host}:{port}"),
        _ => host.to_string(),
    };
    let path = parsed.path().trim_end_matches('/');
    Url::parse(&format!("https://{authority}{path}"))
        .map(Some)
        .map_err(|_| invalid())
}

/// The smart-HTTP discovery endpoint for `repo`.
pub fn upload_pack_endpoint(repo: &Url) -> String {
    format!(
        "{}/info/refs?service=git-upload-pack",
        repo.as_str().trim_end_matches('/')
    )
}

//! Manifest discovery and loading.
//!
//! # File format
//!
//! ```yaml
//! my-tool:
//!   description: A command line tool
//!   source: ./tools/my-tool   # optional; defaults to the manifest's directory
//! ```
//!
//! A manifest is a YAML mapping from project title to entry. Entry order is
//! the mapping order, and that order is what later breaks duplicate-title ties,
//! so nothing here may reorder entries.
//!
//! # Discovery order
//!
//! Roots are walked in the order given; inside each directory, children are
//! visited in byte-sorted file-name order. The resulting manifest sequence is
//! therefore stable across runs and filesystems.
//!
//! A symlink named like a manifest is read through to its target. Symlinked
//! directories are not followed, so a link cycle cannot stall discovery.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, ManifestError};
use crate::types::{Manifest, ManifestEntry, ProjectTitle};

/// File names recognised as manifests when no config overrides them.
pub const DEFAULT_MANIFEST_NAMES: &[&str] = &["projsync.yaml", "projsync.yml"];

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

// ---------------------------------------------------------------------------
// 1. Discovery
// ---------------------------------------------------------------------------

/// Result of walking the roots.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Manifest files, in discovery order.
    pub paths: Vec<PathBuf>,
    /// Directories below a root that could not be listed.
    pub failures: Vec<ManifestFailure>,
}

/// Collect every manifest file under `roots`.
///
/// A root that is itself a file is taken as a manifest regardless of its name.
/// A root that does not exist or cannot be listed is an error; a directory
/// below it that cannot be listed is recorded in [`Discovery::failures`] and
/// the walk continues.
pub fn discover(roots: &[PathBuf], names: &[String]) -> Result<Discovery, ManifestError> {
    let mut found = Discovery::default();
    for root in roots {
        let meta = std::fs::metadata(root).map_err(|e| io_err(root, e))?;
        if meta.is_file() {
            found.paths.push(root.clone());
        } else {
            let entries = sorted_entries(root).map_err(|e| io_err(root, e))?;
            walk(entries, names, &mut found);
        }
    }
    Ok(found)
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<std::fs::DirEntry>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn walk(entries: Vec<std::fs::DirEntry>, names: &[String], found: &mut Discovery) {
    for entry in entries {
        let fname = entry.file_name();
        let name = fname.to_string_lossy();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
                continue;
            }
            let path = entry.path();
            match sorted_entries(&path) {
                Ok(children) => walk(children, names, found),
                Err(e) => {
                    tracing::debug!("cannot list {}: {e}", path.display());
                    found.failures.push(ManifestFailure { error: io_err(&path, e), path });
                }
            }
        } else if names.iter().any(|n| n.as_str() == name) && is_manifest_file(&entry, file_type) {
            found.paths.push(entry.path());
        }
    }
}

// Symlinked files are followed; symlinked directories are never descended.
fn is_manifest_file(entry: &std::fs::DirEntry, file_type: std::fs::FileType) -> bool {
    if file_type.is_symlink() {
        return std::fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false);
    }
    file_type.is_file()
}

// ---------------------------------------------------------------------------
// 2. Parse
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawEntry {
    description: String,
    #[serde(default)]
    source: Option<PathBuf>,
}

/// Parse manifest `contents` read from `path`.
///
/// Relative `source` values are resolved against the manifest's directory.
pub fn parse(path: &Path, contents: &str) -> Result<Manifest, ManifestError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(contents).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mapping = match value {
        serde_yaml::Value::Null => {
            return Ok(Manifest { path: path.to_path_buf(), entries: vec![] });
        }
        serde_yaml::Value::Mapping(m) => m,
        _ => return Err(malformed(path, "top level must be a mapping of title to project")),
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, raw) in mapping {
        let serde_yaml::Value::String(title) = key else {
            return Err(malformed(path, "project titles must be strings"));
        };
        let raw: RawEntry = serde_yaml::from_value(raw)
            .map_err(|e| malformed(path, &format!("project '{title}': {e}")))?;
        let source = match raw.source {
            Some(s) if s.is_absolute() => s,
            Some(s) => base.join(s),
            None => base.to_path_buf(),
        };
        entries.push(ManifestEntry {
            title: ProjectTitle::from(title),
            description: raw.description,
            source,
        });
    }

    Ok(Manifest { path: path.to_path_buf(), entries })
}

fn malformed(path: &Path, message: &str) -> ManifestError {
    ManifestError::Malformed {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Read and parse a single manifest file.
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse(path, &contents)
}

/// A manifest that could not be loaded, kept for reporting.
#[derive(Debug)]
pub struct ManifestFailure {
    pub path: PathBuf,
    pub error: ManifestError,
}

/// Outcome of loading a batch of manifests.
#[derive(Debug, Default)]
pub struct LoadedManifests {
    /// Successfully parsed manifests, in input order.
    pub manifests: Vec<Manifest>,
    pub failures: Vec<ManifestFailure>,
}

/// Load every path, isolating failures per file.
pub fn load_all(paths: &[PathBuf]) -> LoadedManifests {
    let mut loaded = LoadedManifests::default();
    for path in paths {
        match load(path) {
            Ok(manifest) => {
                tracing::debug!("loaded manifest {} ({} projects)", path.display(), manifest.entries.len());
                loaded.manifests.push(manifest);
            }
            Err(error) => loaded.failures.push(ManifestFailure { path: path.clone(), error }),
        }
    }
    loaded
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

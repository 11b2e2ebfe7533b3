//! Deterministic fakes shared by the projsync-sync integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use projsync_core::{OwnershipMap, Project, ProjectTitle, PusherId, Visibility};
use projsync_sync::{Catalog, CatalogError};
use projsync_visibility::{ResolveVisibility, VisibilityError};

/// In-memory catalog recording every call.
#[derive(Default)]
pub struct FakeCatalog {
    pub ownership: OwnershipMap,
    /// Titles whose push/delete returns `Ok(false)`.
    pub declines: HashSet<String>,
    /// Titles whose push/delete returns a transport error.
    pub breaks: HashSet<String>,
    /// Titles whose push/delete panics mid-call.
    pub panics: HashSet<String>,
    pub fail_fetch: bool,
    pub fetched: Mutex<Vec<BTreeSet<ProjectTitle>>>,
    pub pushed: Mutex<Vec<(PusherId, ProjectTitle)>>,
    pub deleted: Mutex<Vec<ProjectTitle>>,
}

impl FakeCatalog {
    pub fn with_ownership(pairs: &[(&str, &str)]) -> Self {
        Self {
            ownership: pairs
                .iter()
                .map(|(t, p)| (ProjectTitle::from(*t), PusherId::from(*p)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn pushed_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> =
            self.pushed.lock().unwrap().iter().map(|(_, t)| t.0.clone()).collect();
        titles.sort();
        titles
    }

    pub fn deleted_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.deleted.lock().unwrap().iter().map(|t| t.0.clone()).collect();
        titles.sort();
        titles
    }

    fn answer(&self, title: &ProjectTitle) -> Result<bool, CatalogError> {
        if self.panics.contains(title.as_str()) {
            panic!("client bug on {title}");
        }
        if self.breaks.contains(title.as_str()) {
            return Err(CatalogError::Transport { message: "connection reset".into() });
        }
        Ok(!self.declines.contains(title.as_str()))
    }
}

impl Catalog for FakeCatalog {
    fn fetch_ownership(&self, titles: &BTreeSet<ProjectTitle>) -> Result<OwnershipMap, CatalogError> {
        self.fetched.lock().unwrap().push(titles.clone());
        if self.fail_fetch {
            return Err(CatalogError::Status { status: 503 });
        }
        Ok(self.ownership.clone())
    }

    fn push(&self, pusher: &PusherId, project: &Project) -> Result<bool, CatalogError> {
        self.pushed.lock().unwrap().push((pusher.clone(), project.title.clone()));
        self.answer(&project.title)
    }

    fn delete(&self, title: &ProjectTitle) -> Result<bool, CatalogError> {
        self.deleted.lock().unwrap().push(title.clone());
        self.answer(title)
    }
}

/// Private iff the path contains "private"; probe error iff it contains "flaky".
pub struct PathRules;

impl ResolveVisibility for PathRules {
    fn resolve(&self, source: &Path) -> Result<bool, VisibilityError> {
        let s = source.to_string_lossy();
        if s.contains("flaky") {
            return Err(VisibilityError::UnexpectedStatus { url: s.into_owned(), status: 500 });
        }
        Ok(s.contains("private"))
    }
}

pub fn project(title: &str, origin: &str, visibility: Visibility) -> Project {
    Project {
        title: ProjectTitle::from(title),
        description: format!("{title} description"),
        source: PathBuf::from(format!("/src/{title}")),
        origin: PathBuf::from(origin),
        visibility,
    }
}

pub fn public(title: &str, origin: &str) -> Project {
    project(title, origin, Visibility::Public)
}

pub fn me() -> PusherId {
    PusherId::from("me")
}

//! HTTP client for the remote catalog.
//!
//! | call | request | success |
//! |---|---|---|
//! | ownership | `POST /api/v1/ownership` `{"titles": [...]}` | JSON object title → pusher |
//! | push | `PUT /api/v1/projects/<title>` | any 2xx |
//! | delete | `DELETE /api/v1/projects/<title>` | any 2xx |
//!
//! A 4xx/5xx on push or delete is a declined call (`Ok(false)`); only
//! transport failures are errors.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Serialize;
use url::Url;

use projsync_core::{OwnershipMap, Project, ProjectTitle, PusherId};
use projsync_sync::{Catalog, CatalogError};

pub struct HttpCatalog {
    agent: ureq::Agent,
    base: Url,
    token: String,
}

#[derive(Serialize)]
struct OwnershipRequest<'a> {
    titles: Vec<&'a str>,
}

#[derive(Serialize)]
struct PushBody<'a> {
    title: &'a str,
    description: &'a str,
    source: String,
    pusher: &'a str,
}

impl HttpCatalog {
    pub fn new(base: &str, token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base).map_err(|e| anyhow::anyhow!("invalid catalog URL '{base}': {e}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid catalog URL '{base}': not a hierarchical URL");
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("projsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Ok(Self { agent, base, token: token.to_string() })
    }

    fn url_for(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn project_url(&self, title: &ProjectTitle) -> String {
        self.url_for(&["api", "v1", "projects", title.as_str()])
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl Catalog for HttpCatalog {
    fn fetch_ownership(&self, titles: &BTreeSet<ProjectTitle>) -> Result<OwnershipMap, CatalogError> {
        let body = OwnershipRequest { titles: titles.iter().map(ProjectTitle::as_str).collect() };
        let response = self
            .agent
            .post(&self.url_for(&["api", "v1", "ownership"]))
            .set("Authorization", &self.authorization())
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => CatalogError::Status { status },
                ureq::Error::Transport(t) => CatalogError::Transport { message: t.to_string() },
            })?;
        let raw: BTreeMap<String, String> = response
            .into_json()
            .map_err(|e| CatalogError::Decode { message: e.to_string() })?;
        Ok(raw
            .into_iter()
            .map(|(title, pusher)| (ProjectTitle::from(title), PusherId::from(pusher)))
            .collect())
    }

    fn push(&self, pusher: &PusherId, project: &Project) -> Result<bool, CatalogError> {
        let body = PushBody {
            title: project.title.as_str(),
            description: &project.description,
            source: project.source.display().to_string(),
            pusher: &pusher.0,
        };
        let result = self
            .agent
            .put(&self.project_url(&project.title))
            .set("Authorization", &self.authorization())
            .send_json(&body);
        succeeded(result)
    }

    fn delete(&self, title: &ProjectTitle) -> Result<bool, CatalogError> {
        let result = self
            .agent
            .delete(&self.project_url(title))
            .set("Authorization", &self.authorization())
            .call();
        succeeded(result)
    }
}

fn succeeded(result: Result<ureq::Response, ureq::Error>) -> Result<bool, CatalogError> {
    match result {
        Ok(response) => Ok((200..300).contains(&response.status())),
        Err(ureq::Error::Status(status, _)) => {
            tracing::debug!("catalog declined with HTTP {status}");
            Ok(false)
        }
        Err(ureq::Error::Transport(t)) => Err(CatalogError::Transport { message: t.to_string() }),
    }
}

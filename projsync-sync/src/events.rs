//! Structured run events.
//!
//! Components never log directly; they emit [`SyncEvent`]s into the
//! [`SyncEvents`] sink they were handed. [`TracingEvents`] is the production
//! sink, [`RecordingEvents`] keeps everything for assertions.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

use projsync_core::ProjectTitle;

use crate::reconcile::{RejectReason, Warning};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A manifest could not be loaded and was left out of the run.
    ManifestSkipped { path: PathBuf, error: String },
    CandidatesCollected { manifests: usize, candidates: usize },
    Accepted { title: ProjectTitle, origin: PathBuf, warnings: Vec<Warning> },
    Rejected { title: ProjectTitle, origin: PathBuf, reason: RejectReason },
    /// Dry run: the push was not issued.
    PushSkipped { title: ProjectTitle },
    Pushed { title: ProjectTitle },
    PushFailed { title: ProjectTitle, error: String },
    /// Dry run: the delete was not issued.
    DeleteSkipped { title: ProjectTitle },
    Deleted { title: ProjectTitle },
    DeleteFailed { title: ProjectTitle, error: String },
    /// Dangling projects left alone because deletion was not requested.
    DanglingRetained { titles: Vec<ProjectTitle> },
}

/// Sink for [`SyncEvent`]s.
pub trait SyncEvents: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl SyncEvents for TracingEvents {
    fn emit(&self, event: &SyncEvent) {
        match event {
            SyncEvent::ManifestSkipped { path, error } => {
                tracing::warn!(manifest = %path.display(), %error, "skipping manifest");
            }
            SyncEvent::CandidatesCollected { manifests, candidates } => {
                tracing::info!(manifests, candidates, "collected candidate projects");
            }
            SyncEvent::Accepted { title, origin, warnings } => {
                for warning in warnings {
                    tracing::warn!(%title, origin = %origin.display(), %warning, "accepting with warning");
                }
                tracing::debug!(%title, origin = %origin.display(), "accepted");
            }
            SyncEvent::Rejected { title, origin, reason } => {
                tracing::warn!(%title, origin = %origin.display(), %reason, "rejected");
            }
            SyncEvent::PushSkipped { title } => {
                tracing::warn!(%title, "[dry-run] would push");
            }
            SyncEvent::Pushed { title } => tracing::info!(%title, "pushed"),
            SyncEvent::PushFailed { title, error } => {
                tracing::error!(%title, %error, "push failed");
            }
            SyncEvent::DeleteSkipped { title } => {
                tracing::warn!(%title, "[dry-run] would delete");
            }
            SyncEvent::Deleted { title } => tracing::info!(%title, "deleted"),
            SyncEvent::DeleteFailed { title, error } => {
                tracing::error!(%title, %error, "delete failed");
            }
            SyncEvent::DanglingRetained { titles } => {
                tracing::info!(
                    count = titles.len(),
                    "leaving dangling projects in place; pass --delete-missing to remove them"
                );
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl SyncEvents for NoopEvents {
    fn emit(&self, _event: &SyncEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl SyncEvents for RecordingEvents {
    fn emit(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

//! Sync execution: apply pushes and deletes against the catalog.
//!
//! Pushes and deletes share one bounded pool. They touch disjoint titles, so
//! no ordering between them is needed. A failed call is recorded and the rest
//! of the batch carries on; nothing is retried or rolled back.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use projsync_core::{Project, ProjectTitle, PusherId, ReconciliationPolicy};

use crate::catalog::Catalog;
use crate::error::SyncError;
use crate::events::{SyncEvent, SyncEvents};
use crate::pool::map_blocking;

/// A push or delete that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationFailure {
    pub title: ProjectTitle,
    pub error: String,
}

/// Summary of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub pushed: usize,
    pub deleted: usize,
    /// Dry run: pushes that would have been issued.
    pub skipped_pushes: usize,
    /// Dry run: deletes that would have been issued.
    pub skipped_deletes: usize,
    /// Dangling titles left alone because deletion was not requested.
    pub retained_dangling: usize,
    pub push_errors: Vec<OperationFailure>,
    pub delete_errors: Vec<OperationFailure>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        !self.push_errors.is_empty() || !self.delete_errors.is_empty()
    }
}

enum Operation {
    Push(Project),
    Delete(ProjectTitle),
}

/// Push `accepted` and, when the policy asks for it, delete `dangling`.
///
/// In dry-run mode the catalog is never called and nothing is counted as
/// pushed or deleted.
pub async fn execute(
    pusher: &PusherId,
    accepted: &[Project],
    dangling: &BTreeSet<ProjectTitle>,
    policy: &ReconciliationPolicy,
    catalog: Arc<dyn Catalog>,
    concurrency: usize,
    events: &dyn SyncEvents,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let clock = Instant::now();
    let mut report = SyncReport {
        pushed: 0,
        deleted: 0,
        skipped_pushes: 0,
        skipped_deletes: 0,
        retained_dangling: 0,
        push_errors: Vec::new(),
        delete_errors: Vec::new(),
        started_at,
        duration_ms: 0,
    };

    let mut operations: Vec<Operation> = Vec::new();

    for project in accepted {
        if policy.dry_run {
            events.emit(&SyncEvent::PushSkipped { title: project.title.clone() });
            report.skipped_pushes += 1;
        } else {
            operations.push(Operation::Push(project.clone()));
        }
    }

    if policy.delete_missing {
        for title in dangling {
            if policy.dry_run {
                events.emit(&SyncEvent::DeleteSkipped { title: title.clone() });
                report.skipped_deletes += 1;
            } else {
                operations.push(Operation::Delete(title.clone()));
            }
        }
    } else if !dangling.is_empty() {
        events.emit(&SyncEvent::DanglingRetained {
            titles: dangling.iter().cloned().collect(),
        });
        report.retained_dangling = dangling.len();
    }

    let targets: Vec<(bool, ProjectTitle)> = operations
        .iter()
        .map(|op| match op {
            Operation::Push(project) => (true, project.title.clone()),
            Operation::Delete(title) => (false, title.clone()),
        })
        .collect();

    let pusher = pusher.clone();
    let results = map_blocking(operations, concurrency, move |op| match op {
        Operation::Push(project) => catalog.push(&pusher, &project),
        Operation::Delete(title) => catalog.delete(&title),
    })
    .await?;

    for ((is_push, title), result) in targets.into_iter().zip(results) {
        // The outer error is a panic inside the catalog call.
        let failure = match result {
            Ok(Ok(true)) => None,
            Ok(Ok(false)) if is_push => Some("catalog declined the push".to_string()),
            Ok(Ok(false)) => Some("catalog declined the delete".to_string()),
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic),
        };
        match (is_push, failure) {
            (true, None) => {
                events.emit(&SyncEvent::Pushed { title });
                report.pushed += 1;
            }
            (false, None) => {
                events.emit(&SyncEvent::Deleted { title });
                report.deleted += 1;
            }
            (true, Some(error)) => {
                events.emit(&SyncEvent::PushFailed { title: title.clone(), error: error.clone() });
                report.push_errors.push(OperationFailure { title, error });
            }
            (false, Some(error)) => {
                events.emit(&SyncEvent::DeleteFailed { title: title.clone(), error: error.clone() });
                report.delete_errors.push(OperationFailure { title, error });
            }
        }
    }

    report.duration_ms = clock.elapsed().as_millis();
    Ok(report)
}

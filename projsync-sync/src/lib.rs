//! # projsync-sync
//!
//! Reconciliation engine and sync executor.
//!
//! Call [`pipeline::run`] to converge the catalog with the manifests under a
//! set of roots, or [`pipeline::plan`] to see what a run would do. The stages
//! are also exposed on their own: [`aggregate`], [`reconcile`], [`execute`].

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod events;
pub mod execute;
pub mod pipeline;
mod pool;
pub mod reconcile;

pub use aggregate::aggregate;
pub use catalog::Catalog;
pub use error::{CatalogError, SyncError};
pub use events::{NoopEvents, RecordingEvents, SyncEvent, SyncEvents, TracingEvents};
pub use execute::{execute, OperationFailure, SyncReport};
pub use pipeline::{Capabilities, PlanOutcome, RunOutcome, SkippedManifest, SyncRequest};
pub use reconcile::{reconcile, Accepted, Reconciliation, RejectReason, Rejected, Warning};

//! Bounded fan-out of blocking work onto tokio's blocking pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::SyncError;

/// Apply `f` to every item with at most `limit` calls in flight.
///
/// Results come back in input order regardless of completion order. A call
/// that panics yields `Err(message)` in its slot; the others still run to
/// completion. Every spawned call is awaited; there is no cancellation.
pub(crate) async fn map_blocking<T, R, F>(
    items: Vec<T>,
    limit: usize,
    f: F,
) -> Result<Vec<Result<R, String>>, SyncError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut slots: Vec<Option<Result<R, String>>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    let mut join_set = JoinSet::new();

    for (idx, item) in items.into_iter().enumerate() {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|_| SyncError::PoolClosed)?;
        let f = Arc::clone(&f);
        join_set.spawn_blocking(move || {
            let _permit = permit;
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(item)));
            (idx, result.map_err(panic_message))
        });
    }

    while let Some(joined) = join_set.join_next().await {
        let (idx, result) = joined?;
        slots[idx] = Some(result);
    }

    Ok(slots.into_iter().flatten().collect())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

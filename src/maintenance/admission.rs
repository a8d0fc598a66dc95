//! Queue-depth admission control.

use crate::planner;
use crate::planner::coordinator::JobRegistrar;
use crate::planner::generator::DatasetSource;
use crate::store::memory::GridStore;

/// Tops the queue up when it runs low.
///
/// Queue depth is every unit not yet fully resolved, leased or not. Below
/// `minimum_queued`, one fresh dataset is planned, registered, and stored;
/// at or above it, nothing happens. This is the only path that creates jobs
/// outside explicit submissions. Returns whether a job was created.
pub async fn maintain_queue_depth<S, R>(
    store: &GridStore,
    source: &S,
    registrar: &R,
    minimum_queued: usize,
) -> bool
where
    S: DatasetSource,
    R: JobRegistrar,
{
    let (queued, core_id) = store
        .read_state(|state| (state.queued_units(), state.core_id.clone()))
        .await;

    if queued >= minimum_queued {
        return false;
    }

    tracing::info!(
        "work queue low ({} of {} units), planning a new job",
        queued,
        minimum_queued
    );

    let raw = source.next_dataset(&core_id);
    let job_id = planner::admit_job(store, registrar, raw).await;

    tracing::info!("queued new job {}", job_id);
    true
}

//! Store Maintenance
//!
//! The background housekeeping that keeps the job table healthy, run as one
//! periodic tick against the shared store:
//!
//! 1. **`archiver`**: condenses fully reduced jobs into the completed-job
//!    archive and drops them from the active table.
//! 2. **`reclaimer`**: returns units whose lease expired without a result to
//!    the ready pool.
//! 3. **`admission`**: measures remaining queue depth and plans fresh work
//!    when it falls below the configured minimum.
//!
//! Archival and reclamation are pure table mutations and share one lock
//! acquisition; admission may call out to the grid server, so it runs after
//! the lock is released.

pub mod admission;
pub mod archiver;
pub mod reclaimer;


use crate::planner::coordinator::JobRegistrar;
use crate::planner::generator::DatasetSource;
use crate::store::memory::GridStore;
use crate::store::types::now_ms;

use std::sync::Arc;
use std::time::Duration;

/// Periodic maintenance tick. Spawned once at startup; never exits.
pub async fn maintenance_loop<S, R>(
    store: Arc<GridStore>,
    source: S,
    registrar: R,
    minimum_queued: usize,
    interval: Duration,
) where
    S: DatasetSource + 'static,
    R: JobRegistrar + 'static,
{
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        let now = now_ms();
        store
            .with_state(|state| {
                archiver::archive_completed_jobs(state);
                reclaimer::reclaim_stale(state, now, reclaimer::LEASE_TIMEOUT);
            })
            .await;

        admission::maintain_queue_depth(&store, &source, &registrar, minimum_queued).await;

        let (active, queued, archived) = store
            .read_state(|state| {
                (
                    state.jobs.len(),
                    state.queued_units(),
                    state.completed_jobs_count,
                )
            })
            .await;
        tracing::info!(
            "store: {} active jobs, {} queued units, {} archived jobs",
            active,
            queued,
            archived
        );
    }
}

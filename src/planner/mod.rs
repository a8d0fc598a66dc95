//! Reduction Planner
//!
//! Turns a raw dataset into a registered, queued reduction job.
//!
//! ## Pipeline
//! 1. **`engine`**: decomposes `n` matrices into `n - 1` chained work units
//!    and seeds the operand-slot fill queue.
//! 2. **`coordinator`**: registers the job with the external grid server to
//!    obtain a durable job id (best-effort; a local id is minted on failure).
//! 3. The finished record is inserted into the store, where the lease
//!    protocol takes over.
//!
//! `generator` supplies the raw datasets the admission controller plans
//! jobs from.

pub mod coordinator;
pub mod engine;
pub mod generator;

#[cfg(test)]
mod tests;

use crate::store::memory::GridStore;
use crate::store::types::{now_ms, RawDataset};

use self::coordinator::JobRegistrar;

/// Plans, registers, and stores one job. Registration runs before the store
/// is touched, so the network call never holds the table lock.
pub async fn admit_job<R: JobRegistrar>(
    store: &GridStore,
    registrar: &R,
    raw: RawDataset,
) -> String {
    let project_id = store.project_id().await;

    let job = engine::plan_job(raw, now_ms());
    let job = coordinator::register_job(job, &project_id, registrar).await;

    let job_id = job.job_id.clone();
    store.insert_job(job).await;
    job_id
}

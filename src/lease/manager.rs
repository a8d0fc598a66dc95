//! Lease Manager
//!
//! The synchronous read/write surface the HTTP layer drives: hands ready
//! units to workers, accepts their results, fans results into downstream
//! operand slots, and detects job completion. Delegation runs over an
//! unreliable channel with at-least-once delivery, so every lookup fails
//! soft: a miss is a no-op or an empty reply, never an error.

use super::protocol::TaskPayload;
use crate::planner::engine::assign_operand;
use crate::store::memory::GridStore;
use crate::store::types::{now_ms, Matrix, StoreState, UnitStatus};

use std::sync::Arc;

pub struct LeaseManager {
    store: Arc<GridStore>,
}

impl LeaseManager {
    pub fn new(store: Arc<GridStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    /// Leases the first ready unit of the job to the requested token and
    /// returns its operands. `None` means the job is unknown or nothing is
    /// ready yet; the worker should retry later.
    pub async fn fetch_ready_unit(&self, job_id: &str, lease_token: &str) -> Option<TaskPayload> {
        let now = now_ms();
        self.store
            .with_state(|state| fetch_ready_unit(state, job_id, lease_token, now))
            .await
    }

    /// Records a unit result under its lease token. Idempotent: duplicate or
    /// late deliveries are silently ignored.
    pub async fn submit_result(&self, job_id: &str, lease_token: &str, result: Matrix) {
        let now = now_ms();
        self.store
            .with_state(|state| submit_result(state, job_id, lease_token, result, now))
            .await
    }
}

pub fn fetch_ready_unit(
    state: &mut StoreState,
    job_id: &str,
    lease_token: &str,
    now: u64,
) -> Option<TaskPayload> {
    let job = state.job_mut(job_id)?;

    // A finished job has no work left, but the worker still needs some
    // well-formed payload; unit 0's operands serve as a harmless placeholder
    // whose computed result is never used.
    if job.is_complete() {
        let unit = job.units.first()?;
        return Some(TaskPayload {
            matrix_a: unit.operand_a.clone(),
            matrix_b: unit.operand_b.clone(),
        });
    }

    // Re-delivery: if the token already holds a unit, hand its operands out
    // again rather than leasing a second one.
    if let Some(unit) = job
        .units
        .iter()
        .find(|unit| unit.status.token() == Some(lease_token))
    {
        return Some(TaskPayload {
            matrix_a: unit.operand_a.clone(),
            matrix_b: unit.operand_b.clone(),
        });
    }

    let unit = job.units.iter_mut().find(|unit| unit.is_ready())?;
    unit.status = UnitStatus::Leased {
        token: lease_token.to_string(),
        leased_at: now,
    };

    tracing::debug!(
        "leased unit {} of job {} to {}",
        unit.position_index,
        job_id,
        lease_token
    );

    Some(TaskPayload {
        matrix_a: unit.operand_a.clone(),
        matrix_b: unit.operand_b.clone(),
    })
}

pub fn submit_result(
    state: &mut StoreState,
    job_id: &str,
    lease_token: &str,
    result: Matrix,
    now: u64,
) {
    let Some(job) = state.job_mut(job_id) else {
        tracing::debug!("result for unknown job {} dropped", job_id);
        return;
    };

    let Some(index) = job
        .units
        .iter()
        .position(|unit| unit.status.token() == Some(lease_token))
    else {
        tracing::debug!("result for unknown lease {} on job {} dropped", lease_token, job_id);
        return;
    };

    // Duplicate delivery guard.
    if job.units[index].status.is_completed() {
        return;
    }

    job.units[index].status = UnitStatus::Completed {
        token: lease_token.to_string(),
        completed_at: now,
    };
    job.completed_count += 1;

    if job.is_complete() {
        // Last unit of the chain: its output is the reduction's sink.
        job.final_result = Some(result);
        job.completion_time = Some(now);
        tracing::info!("job {} completed", job.job_id);
    } else if assign_operand(job, result).is_none() {
        tracing::warn!(
            "job {} has no open operand slot for the result of unit {}",
            job.job_id,
            index
        );
    }
}

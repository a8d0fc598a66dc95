//! Stale-lease reclamation.

use crate::store::types::{StoreState, UnitStatus};

use std::time::Duration;

/// Leases older than this without a result are considered lost.
pub const LEASE_TIMEOUT: Duration = Duration::from_secs(4 * 60 * 60);

/// Returns every expired lease to the ready pool.
///
/// Only the lease binding is cleared; the unit's operands were written once
/// and stay untouched, so the unit is immediately ready for another worker.
/// Purely local, never fails.
pub fn reclaim_stale(state: &mut StoreState, now: u64, lease_timeout: Duration) -> usize {
    let timeout_ms = lease_timeout.as_millis() as u64;
    let mut reclaimed = 0;

    for job in state.jobs.values_mut() {
        for unit in &mut job.units {
            let expired = matches!(
                &unit.status,
                UnitStatus::Leased { leased_at, .. }
                    if now.saturating_sub(*leased_at) > timeout_ms
            );
            if expired {
                tracing::debug!(
                    "reclaiming unit {} of job {}",
                    unit.position_index,
                    job.job_id
                );
                unit.status = UnitStatus::Unassigned;
                reclaimed += 1;
            }
        }
    }

    if reclaimed > 0 {
        tracing::info!("reclaimed {} expired leases", reclaimed);
    }
    reclaimed
}

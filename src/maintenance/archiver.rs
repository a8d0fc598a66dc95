//! Completed-job archival.

use crate::store::types::{CompletedJobSummary, StoreState};

/// Moves every complete job out of the active table into the archive.
///
/// Each one is condensed to a summary with derived timing before the full
/// record (units, operands and all) is dropped, keeping the active set
/// bounded over long uptimes. Returns how many jobs were archived.
pub fn archive_completed_jobs(state: &mut StoreState) -> usize {
    let done: Vec<String> = state
        .jobs
        .values()
        .filter(|job| job.is_complete())
        .map(|job| job.job_id.clone())
        .collect();

    for job_id in &done {
        let Some(job) = state.jobs.remove(job_id) else {
            continue;
        };

        let completion_time = job.completion_time.unwrap_or(job.creation_time);
        state.completed_jobs.push(CompletedJobSummary {
            job_id: job.job_id,
            core_id: job.core_id,
            unit_count: job.unit_count,
            final_result: job.final_result.unwrap_or_default(),
            creation_time: job.creation_time,
            completion_time,
            elapsed: completion_time.saturating_sub(job.creation_time),
        });
        state.completed_jobs_count += 1;

        tracing::info!("archived job {}", job_id);
    }

    done.len()
}

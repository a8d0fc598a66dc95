//! The authoritative job table and its snapshot persistence.
//!
//! A single `GridStore` instance backs every component. All state lives
//! behind one whole-table `RwLock` so the periodic disk flush always
//! serializes a fully applied view, never a half-mutated one. Durability is
//! bounded by the flush interval: a crash loses at most the mutations since
//! the last successful write.

use super::types::{CompletedJobSummary, JobRecord, StoreState};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// On-disk snapshot layout. Jobs are flattened to an array; the in-memory
/// table is rebuilt keyed by job id on load.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    project_id: String,
    core_id: String,
    jobs: Vec<JobRecord>,
    completed_jobs: Vec<CompletedJobSummary>,
    completed_jobs_count: u64,
}

impl From<&StoreState> for Snapshot {
    fn from(state: &StoreState) -> Self {
        Self {
            project_id: state.project_id.clone(),
            core_id: state.core_id.clone(),
            jobs: state.jobs.values().cloned().collect(),
            completed_jobs: state.completed_jobs.clone(),
            completed_jobs_count: state.completed_jobs_count,
        }
    }
}

impl From<Snapshot> for StoreState {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            project_id: snapshot.project_id,
            core_id: snapshot.core_id,
            jobs: snapshot
                .jobs
                .into_iter()
                .map(|job| (job.job_id.clone(), job))
                .collect(),
            completed_jobs: snapshot.completed_jobs,
            completed_jobs_count: snapshot.completed_jobs_count,
        }
    }
}

/// The durable, in-memory-resident store shared by all components.
pub struct GridStore {
    state: RwLock<StoreState>,
    path: PathBuf,
}

impl GridStore {
    /// Loads the snapshot at `path`, creating an empty one (and any missing
    /// parent directories) if none exists yet.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Arc<Self>> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let empty = serde_json::to_string(&Snapshot::default())?;
            std::fs::write(&path, empty)?;
            tracing::info!("created empty snapshot at {}", path.display());
        }

        let raw = std::fs::read_to_string(&path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        let state = StoreState::from(snapshot);

        tracing::info!(
            "loaded snapshot: {} active jobs, {} archived jobs",
            state.jobs.len(),
            state.completed_jobs.len()
        );

        Ok(Arc::new(Self {
            state: RwLock::new(state),
            path,
        }))
    }

    /// Runs a mutation against the table. The closure executes under the
    /// write lock, so it can never interleave with a flush.
    pub async fn with_state<R>(&self, mutate: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.write().await;
        mutate(&mut state)
    }

    /// Runs a read-only query against the table.
    pub async fn read_state<R>(&self, query: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.state.read().await;
        query(&state)
    }

    /// Serializes the entire table to the snapshot file.
    pub async fn flush(&self) -> Result<()> {
        let json = {
            let state = self.state.read().await;
            serde_json::to_string(&Snapshot::from(&*state))?
        };
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Periodic flush. Write errors are logged and the in-memory state stays
    /// authoritative until the next attempt; the loop never exits.
    pub async fn flush_loop(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.flush().await {
                tracing::error!("snapshot flush failed: {}", e);
            }
        }
    }

    pub async fn insert_job(&self, job: JobRecord) {
        self.with_state(|state| state.insert_job(job)).await;
    }

    pub async fn queued_units(&self) -> usize {
        self.read_state(|state| state.queued_units()).await
    }

    pub async fn project_id(&self) -> String {
        self.read_state(|state| state.project_id.clone()).await
    }

    pub async fn core_id(&self) -> String {
        self.read_state(|state| state.core_id.clone()).await
    }

    pub async fn set_project_id(&self, project_id: String) {
        self.with_state(|state| state.project_id = project_id).await;
    }

    pub async fn set_core_id(&self, core_id: String) {
        self.with_state(|state| state.core_id = core_id).await;
    }
}

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// A dense numeric matrix as exchanged with workers and the grid server.
pub type Matrix = Vec<Vec<f64>>;

/// A raw dataset handed to the planner: the matrices to reduce plus the id
/// of the core the work must run on. Consumed once, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDataset {
    pub coreid: String,
    pub matrixes: Vec<Matrix>,
}

/// Lease state of a work unit.
///
/// A unit starts `Unassigned`, is bound to a worker-supplied token when it is
/// handed out, and keeps that token after completion so duplicate result
/// deliveries can still be matched to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum UnitStatus {
    Unassigned,
    Leased { token: String, leased_at: u64 },
    Completed { token: String, completed_at: u64 },
}

impl UnitStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, UnitStatus::Completed { .. })
    }

    /// The lease token currently bound to the unit, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            UnitStatus::Unassigned => None,
            UnitStatus::Leased { token, .. } | UnitStatus::Completed { token, .. } => Some(token),
        }
    }
}

/// Which of a unit's two operand slots a value lands in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Reference to one still-empty operand slot, queued in fill order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperandSlot {
    pub unit: usize,
    pub side: Side,
}

/// One pairwise-reduction step: two input operands, one output.
///
/// Operand slots are write-once. A unit is *ready* when both operands are
/// present, it is unleased, and it is not completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnit {
    pub owner_job_id: String,
    pub position_index: usize,
    pub status: UnitStatus,
    pub operand_a: Option<Matrix>,
    pub operand_b: Option<Matrix>,
}

impl WorkUnit {
    pub fn is_ready(&self) -> bool {
        self.status == UnitStatus::Unassigned && self.operand_a.is_some() && self.operand_b.is_some()
    }
}

/// One reduction job: an ordered chain of work units whose outputs feed
/// forward into later units' empty operand slots until one result remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub core_id: String,
    pub units: Vec<WorkUnit>,
    pub unit_count: usize,
    pub completed_count: usize,
    pub creation_time: u64,
    pub completion_time: Option<u64>,
    pub final_result: Option<Matrix>,
    /// Still-empty operand slots, front of the queue first. Every operand
    /// write (initial fill and result fan-in) pops the front, so no scan over
    /// the unit chain is ever needed.
    pub open_slots: VecDeque<OperandSlot>,
}

impl JobRecord {
    /// A job is complete once every unit has reported a result.
    pub fn is_complete(&self) -> bool {
        self.completed_count == self.unit_count
    }

    /// Units not yet resolved, leased or not.
    pub fn remaining_units(&self) -> usize {
        self.unit_count - self.completed_count
    }

    /// Adopts a job id and stamps it onto every unit in the chain.
    pub fn adopt_id(&mut self, job_id: String) {
        for unit in &mut self.units {
            unit.owner_job_id = job_id.clone();
        }
        self.job_id = job_id;
    }
}

/// Archival record of a fully reduced job. Built exactly once, when the
/// archiver drops the full record from the active table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedJobSummary {
    pub job_id: String,
    pub core_id: String,
    pub unit_count: usize,
    pub final_result: Matrix,
    pub creation_time: u64,
    pub completion_time: u64,
    pub elapsed: u64,
}

/// The in-memory table behind every component: active jobs keyed by id plus
/// the completed-job archive and the node's grid identity.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub project_id: String,
    pub core_id: String,
    pub jobs: HashMap<String, JobRecord>,
    pub completed_jobs: Vec<CompletedJobSummary>,
    pub completed_jobs_count: u64,
}

impl StoreState {
    pub fn job_mut(&mut self, job_id: &str) -> Option<&mut JobRecord> {
        self.jobs.get_mut(job_id)
    }

    /// Inserts a job, replacing any record already stored under its id.
    pub fn insert_job(&mut self, job: JobRecord) {
        self.jobs.insert(job.job_id.clone(), job);
    }

    /// Total units not yet resolved across all active jobs.
    pub fn queued_units(&self) -> usize {
        self.jobs.values().map(|job| job.remaining_units()).sum()
    }
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

//! Wire Contracts
//!
//! DTOs for the worker-facing HTTP surface. Field names are pinned to the
//! grid protocol (`matrixA`/`matrixB`, lowercase query keys), so workers
//! built against the original deployment keep working unchanged.

use crate::store::types::Matrix;

use serde::{Deserialize, Serialize};

pub const ENDPOINT_GET_TASK: &str = "/get-task";
pub const ENDPOINT_SUBMIT_TASK: &str = "/submit-task";
pub const ENDPOINT_CREATE_JOB: &str = "/create-job";

/// Query string every worker request carries: which core it runs, which job
/// it wants work from, and the lease token it picked for the unit.
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub coreid: String,
    pub jobid: String,
    pub taskid: String,
}

/// Operand payload handed to a worker. Either side may be absent when the
/// payload is a placeholder for a job with no remaining work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(rename = "matrixA", skip_serializing_if = "Option::is_none")]
    pub matrix_a: Option<Matrix>,
    #[serde(rename = "matrixB", skip_serializing_if = "Option::is_none")]
    pub matrix_b: Option<Matrix>,
}

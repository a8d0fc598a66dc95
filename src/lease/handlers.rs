use super::manager::LeaseManager;
use super::protocol::{TaskPayload, TaskQuery};
use crate::planner;
use crate::planner::coordinator::CoordinatorClient;
use crate::store::memory::GridStore;
use crate::store::types::{Matrix, RawDataset};

use axum::{extract::Query, http::StatusCode, Extension, Json};
use std::sync::Arc;

/// `GET /get-task`: a worker asks for a unit of the job, naming the lease
/// token it will report the result under.
pub async fn handle_get_task(
    Extension(manager): Extension<Arc<LeaseManager>>,
    Query(query): Query<TaskQuery>,
) -> (StatusCode, Json<Option<TaskPayload>>) {
    match manager.fetch_ready_unit(&query.jobid, &query.taskid).await {
        Some(payload) => (StatusCode::OK, Json(Some(payload))),
        None => (StatusCode::NOT_FOUND, Json(None)),
    }
}

/// `POST /submit-task`: a worker reports a unit result. Always `200`:
/// duplicate, late, or unmatched deliveries are expected and ignored.
pub async fn handle_submit_task(
    Extension(manager): Extension<Arc<LeaseManager>>,
    Query(query): Query<TaskQuery>,
    Json(result): Json<Matrix>,
) -> StatusCode {
    manager.submit_result(&query.jobid, &query.taskid, result).await;
    StatusCode::OK
}

/// `POST /create-job`: explicit job submission with a caller-supplied
/// dataset. A reduction needs at least two matrices.
pub async fn handle_create_job(
    Extension(store): Extension<Arc<GridStore>>,
    Extension(coordinator): Extension<CoordinatorClient>,
    Json(raw): Json<RawDataset>,
) -> StatusCode {
    if raw.matrixes.len() < 2 {
        tracing::warn!("rejected dataset with {} matrices", raw.matrixes.len());
        return StatusCode::UNPROCESSABLE_ENTITY;
    }

    let job_id = planner::admit_job(&store, &coordinator, raw).await;
    tracing::info!("created job {} from submitted dataset", job_id);

    StatusCode::CREATED
}

//! Grid server collaborator.
//!
//! The coordinator mints durable job identifiers and hands out the node's
//! grid identity (project id, core id). Every call here is best-effort over
//! an unreliable channel: a failure is logged and the caller continues, it
//! is never retried in-line and never fatal.

use crate::config::GridConfig;
use crate::store::types::JobRecord;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can turn a planned job into a registered one.
pub trait JobRegistrar: Send + Sync {
    fn register(
        &self,
        job: &JobRecord,
        project_id: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[derive(Serialize)]
struct RegisterJobRequest<'a> {
    projectid: &'a str,
    coreid: &'a str,
    #[serde(rename = "taskAmount")]
    task_amount: usize,
    #[serde(rename = "taskRequestEndpoint")]
    task_request_endpoint: &'a str,
    #[serde(rename = "taskResultEndpoint")]
    task_result_endpoint: &'a str,
}

#[derive(Deserialize)]
struct RegisterJobReply {
    jobid: String,
}

#[derive(Deserialize)]
struct SignupReply {
    projectid: String,
}

#[derive(Deserialize)]
struct CoreUploadReply {
    coreid: String,
}

/// HTTP client for the grid server.
#[derive(Clone)]
pub struct CoordinatorClient {
    client: reqwest::Client,
    endpoint: String,
    task_request_endpoint: String,
    task_result_endpoint: String,
}

impl CoordinatorClient {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.grid_server_endpoint.trim_end_matches('/').to_string(),
            task_request_endpoint: config.task_request_endpoint.clone(),
            task_result_endpoint: config.task_result_endpoint.clone(),
        }
    }

    /// Requests a fresh project id from the grid server.
    pub async fn sign_up(&self) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/project/signup", self.endpoint))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("signup failed: {}", response.status()));
        }

        let reply: SignupReply = response.json().await?;
        Ok(reply.projectid)
    }

    /// Uploads the core bundle and returns the core id the grid assigns it.
    pub async fn upload_core(&self, bundle_path: &Path) -> Result<String> {
        let bundle = tokio::fs::read(bundle_path).await?;

        let form = reqwest::multipart::Form::new().part(
            "core",
            reqwest::multipart::Part::bytes(bundle).file_name("core"),
        );

        let response = self
            .client
            .post(format!("{}/api/project/core", self.endpoint))
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("core upload failed: {}", response.status()));
        }

        let reply: CoreUploadReply = response.json().await?;
        Ok(reply.coreid)
    }
}

impl JobRegistrar for CoordinatorClient {
    /// Submits the job's shape and this node's task endpoints; the grid
    /// server answers with the durable job id.
    async fn register(&self, job: &JobRecord, project_id: &str) -> Result<String> {
        let request = RegisterJobRequest {
            projectid: project_id,
            coreid: &job.core_id,
            task_amount: job.unit_count,
            task_request_endpoint: &self.task_request_endpoint,
            task_result_endpoint: &self.task_result_endpoint,
        };

        let response = self
            .client
            .post(format!("{}/project/job", self.endpoint))
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("registration failed: {}", response.status()));
        }

        let reply: RegisterJobReply = response.json().await?;
        Ok(reply.jobid)
    }
}

/// Registers a planned job with the coordinator.
///
/// On success the job adopts the coordinator-issued id; on any failure it
/// adopts a locally minted placeholder instead and stays fully usable; the
/// lease protocol does not require a coordinator id to function.
pub async fn register_job<R: JobRegistrar>(
    mut job: JobRecord,
    project_id: &str,
    registrar: &R,
) -> JobRecord {
    match registrar.register(&job, project_id).await {
        Ok(job_id) => {
            tracing::info!("registered job {} ({} units)", job_id, job.unit_count);
            job.adopt_id(job_id);
        }
        Err(e) => {
            let local_id = format!("local-{}", Uuid::new_v4());
            tracing::warn!(
                "job registration failed ({}), continuing with local id {}",
                e,
                local_id
            );
            job.adopt_id(local_id);
        }
    }
    job
}

/// Whether a persisted grid identity still needs to be obtained.
pub fn identity_missing(id: &str) -> bool {
    matches!(id, "" | "0000" | "null" | "undefined")
}

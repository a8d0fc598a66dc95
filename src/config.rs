//! Environment-sourced configuration.
//!
//! Every knob has the deployment's conventional default and can be
//! overridden through the environment (a `.env` file is loaded at startup).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_PATH: &str = "./data/database.json";
const DEFAULT_CORE_PATH: &str = "./bundle.js";
const DEFAULT_TASK_REQUEST_ENDPOINT: &str = "http://localhost:3001/get-task";
const DEFAULT_TASK_RESULT_ENDPOINT: &str = "http://localhost:3001/submit-task";
const DEFAULT_GRID_SERVER_ENDPOINT: &str = "http://localhost:3000";
const DEFAULT_TASK_AMOUNT: usize = 100;
const DEFAULT_MATRIX_HEIGHT: usize = 25;
const DEFAULT_MATRIX_WIDTH: usize = 25;
const DEFAULT_MINIMUM_TASKS: usize = 100;
const DEFAULT_MAINTENANCE_INTERVAL_MS: u64 = 6000;

#[derive(Debug, Clone)]
pub struct GridConfig {
    /// HTTP listen port for the worker-facing surface.
    pub port: u16,
    /// Snapshot file backing the store.
    pub snapshot_path: PathBuf,
    /// Admission threshold: plan new work below this many queued units.
    pub minimum_tasks: usize,
    /// Reduction units per generated job.
    pub task_amount: usize,
    pub matrix_height: usize,
    pub matrix_width: usize,
    /// Tick for archival, reclamation, and admission.
    pub maintenance_interval: Duration,
    /// Grid server (coordinator) base URL.
    pub grid_server_endpoint: String,
    /// Endpoints advertised to the coordinator at job registration.
    pub task_request_endpoint: String,
    pub task_result_endpoint: String,
    /// Core bundle uploaded at first signup.
    pub core_bundle_path: PathBuf,
    /// Pre-issued identity, if the deployment supplies one.
    pub project_id: Option<String>,
    pub core_id: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            snapshot_path: PathBuf::from(DEFAULT_DB_PATH),
            minimum_tasks: DEFAULT_MINIMUM_TASKS,
            task_amount: DEFAULT_TASK_AMOUNT,
            matrix_height: DEFAULT_MATRIX_HEIGHT,
            matrix_width: DEFAULT_MATRIX_WIDTH,
            maintenance_interval: Duration::from_millis(DEFAULT_MAINTENANCE_INTERVAL_MS),
            grid_server_endpoint: DEFAULT_GRID_SERVER_ENDPOINT.to_string(),
            task_request_endpoint: DEFAULT_TASK_REQUEST_ENDPOINT.to_string(),
            task_result_endpoint: DEFAULT_TASK_RESULT_ENDPOINT.to_string(),
            core_bundle_path: PathBuf::from(DEFAULT_CORE_PATH),
            project_id: None,
            core_id: None,
        }
    }
}

impl GridConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env_parse("PORT", defaults.port),
            snapshot_path: env_var("JOBS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            minimum_tasks: env_parse("MINIMUM_TASKS", defaults.minimum_tasks),
            task_amount: env_parse("TASK_AMOUNT", defaults.task_amount),
            matrix_height: env_parse("MATRIX_HEIGHT", defaults.matrix_height),
            matrix_width: env_parse("MATRIX_WIDTH", defaults.matrix_width),
            maintenance_interval: Duration::from_millis(env_parse(
                "MAINTENANCE_INTERVAL",
                DEFAULT_MAINTENANCE_INTERVAL_MS,
            )),
            grid_server_endpoint: env_var("GRID_SERVER_ENDPOINT")
                .unwrap_or(defaults.grid_server_endpoint),
            task_request_endpoint: env_var("TASK_REQUEST_ENDPOINT")
                .unwrap_or(defaults.task_request_endpoint),
            task_result_endpoint: env_var("TASK_RESULT_ENDPOINT")
                .unwrap_or(defaults.task_result_endpoint),
            core_bundle_path: env_var("GRID_CORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.core_bundle_path),
            project_id: env_var("PROJECTID"),
            core_id: env_var("CORE_ID"),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use matrix_grid::config::GridConfig;
use matrix_grid::lease::handlers::{handle_create_job, handle_get_task, handle_submit_task};
use matrix_grid::lease::manager::LeaseManager;
use matrix_grid::lease::protocol::{ENDPOINT_CREATE_JOB, ENDPOINT_GET_TASK, ENDPOINT_SUBMIT_TASK};
use matrix_grid::maintenance;
use matrix_grid::maintenance::admission::maintain_queue_depth;
use matrix_grid::planner::coordinator::{identity_missing, CoordinatorClient};
use matrix_grid::planner::generator::RandomDatasets;
use matrix_grid::store::memory::GridStore;

const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = GridConfig::from_env();

    let store = GridStore::load_or_create(&config.snapshot_path)?;
    let coordinator = CoordinatorClient::new(&config);
    let datasets = RandomDatasets::from_config(&config);

    run_setup(&store, &coordinator, &datasets, &config).await;

    let manager = LeaseManager::new(store.clone());

    // Background services: periodic snapshot flush plus the maintenance tick
    // (archival, lease reclamation, admission control).
    tokio::spawn(store.clone().flush_loop(FLUSH_INTERVAL));
    tokio::spawn(maintenance::maintenance_loop(
        store.clone(),
        datasets,
        coordinator.clone(),
        config.minimum_tasks,
        config.maintenance_interval,
    ));

    let app = Router::new()
        .route(ENDPOINT_GET_TASK, get(handle_get_task))
        .route(ENDPOINT_SUBMIT_TASK, post(handle_submit_task))
        .route(ENDPOINT_CREATE_JOB, post(handle_create_job))
        .layer(Extension(manager))
        .layer(Extension(store.clone()))
        .layer(Extension(coordinator.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("grid core server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Mutations since the last periodic flush would otherwise be lost.
    if let Err(e) = store.flush().await {
        tracing::error!("final snapshot flush failed: {}", e);
    }

    Ok(())
}

/// Startup tasks: obtain any missing grid identity and make sure the queue
/// holds work before the first maintenance tick.
async fn run_setup(
    store: &Arc<GridStore>,
    coordinator: &CoordinatorClient,
    datasets: &RandomDatasets,
    config: &GridConfig,
) {
    if identity_missing(&store.project_id().await) {
        match config.project_id.clone() {
            Some(project_id) => store.set_project_id(project_id).await,
            None => match coordinator.sign_up().await {
                Ok(project_id) => {
                    tracing::info!("signed up as project {}", project_id);
                    store.set_project_id(project_id).await;
                }
                Err(e) => tracing::warn!("project signup failed: {}", e),
            },
        }
    }

    if identity_missing(&store.core_id().await) {
        match config.core_id.clone() {
            Some(core_id) => store.set_core_id(core_id).await,
            None => match coordinator.upload_core(&config.core_bundle_path).await {
                Ok(core_id) => {
                    tracing::info!("registered core {}", core_id);
                    store.set_core_id(core_id).await;
                }
                Err(e) => tracing::warn!("core upload failed: {}", e),
            },
        }
    }

    if store.queued_units().await == 0 {
        tracing::info!("store holds no queued work, priming the queue");
        maintain_queue_depth(store, datasets, coordinator, config.minimum_tasks).await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutdown signal received, flushing snapshot");
}

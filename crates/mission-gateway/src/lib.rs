//! mission-gateway: HTTP API over the on-disk documents.
//!
//! Provides:
//! - REST routes for agents, cron jobs, tasks and settings
//! - Static assets at `/` and the data directory at `/data`
//! - HTTP Basic authentication in front of everything
//! - HTTP health check endpoint

pub mod auth;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Router, middleware};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use mission_agents::AgentDirectory;
use mission_config::MissionConfig;
use mission_cron::CronStore;
use mission_storage::{SettingsStore, TaskStore};

pub use auth::BasicCredentials;

/// Shared gateway state. Stores hold only paths; every request reads disk.
pub struct GatewayState {
    pub cron: CronStore,
    pub tasks: TaskStore,
    pub settings: SettingsStore,
    pub agents: AgentDirectory,
    pub credentials: BasicCredentials,
    pub public_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl GatewayState {
    pub fn from_config(config: &MissionConfig) -> Self {
        Self {
            cron: CronStore::new(config.cron_jobs_path()),
            tasks: TaskStore::new(config.tasks_path()),
            settings: SettingsStore::new(config.settings_path()),
            agents: AgentDirectory::new(config.sessions_root()),
            credentials: BasicCredentials::new(
                config.gateway.username.clone(),
                config.gateway.password.clone(),
            ),
            public_dir: config.paths.public_dir.clone(),
            data_dir: config.paths.data_dir.clone(),
        }
    }
}

/// Build the router with every route behind Basic auth.
pub fn app_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/agents", get(handlers::list_agents))
        .route(
            "/api/cron/jobs",
            get(handlers::list_cron_jobs).post(handlers::create_cron_job),
        )
        .route(
            "/api/cron/jobs/{job_id}",
            put(handlers::update_cron_job).delete(handlers::delete_cron_job),
        )
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{task_id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .nest_service("/data", ServeDir::new(&state.data_dir))
        .fallback_service(ServeDir::new(&state.public_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .with_state(state)
}

/// Start the HTTP server.
///
/// Binds to the configured address (or the overrides) and serves until the
/// process exits.
pub async fn start_gateway(
    config: MissionConfig,
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = port_override.unwrap_or(config.gateway.port);
    let host = host_override.unwrap_or_else(|| config.gateway.host.clone());

    if config.uses_default_password() {
        warn!("Using the default password; set MISSION_CONTROL_PASSWORD to change it");
    }

    let state = Arc::new(GatewayState::from_config(&config));
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    info!("Mission Control listening on http://{addr}");
    info!("  Protected by Basic auth as user: {}", state.credentials.username());
    info!("  Static:    {}", state.public_dir.display());
    info!("  Data:      {}", state.data_dir.display());
    info!("  Cron jobs: {}", state.cron.path().display());
    info!("  Sessions:  {}", state.agents.root().display());

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health: simple HTTP health check.
async fn health_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! REST handlers for `/api/*`.
//!
//! The stores do synchronous file IO, so every store call runs on the
//! blocking pool.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use mission_types::{CronJobPatch, NewCronJob, NewTask, Settings, TaskDocument, TaskPatch};

use crate::GatewayState;
use crate::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

async fn blocking<T, F>(state: Arc<GatewayState>, f: F) -> ApiResult<T>
where
    F: FnOnce(&GatewayState) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {e}")))?
}

/// GET /api/agents: one summary per agent directory.
pub async fn list_agents(State(state): State<Arc<GatewayState>>) -> ApiResult<Json<Value>> {
    let agents = blocking(state, |s| Ok(s.agents.list_agents()?)).await?;
    Ok(Json(json!({ "agents": agents })))
}

/// GET /api/cron/jobs
pub async fn list_cron_jobs(State(state): State<Arc<GatewayState>>) -> ApiResult<Json<Value>> {
    let jobs = blocking(state, |s| Ok(s.cron.list_jobs())).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// POST /api/cron/jobs: requires `name`, `schedule`, `payload`.
pub async fn create_cron_job(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<NewCronJob>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = payload?;
    let job = blocking(state, move |s| Ok(s.cron.create_job(input)?)).await?;
    Ok(Json(json!({ "success": true, "job": job })))
}

/// PUT /api/cron/jobs/{job_id}: shallow merge onto the stored job.
pub async fn update_cron_job(
    State(state): State<Arc<GatewayState>>,
    Path(job_id): Path<String>,
    payload: Result<Json<CronJobPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(patch) = payload?;
    let job = blocking(state, move |s| Ok(s.cron.update_job(&job_id, patch)?)).await?;
    Ok(Json(json!({ "success": true, "job": job })))
}

/// DELETE /api/cron/jobs/{job_id}
pub async fn delete_cron_job(
    State(state): State<Arc<GatewayState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job_id = blocking(state, move |s| Ok(s.cron.delete_job(&job_id)?)).await?;
    Ok(Json(json!({ "success": true, "jobId": job_id })))
}

/// GET /api/tasks
pub async fn list_tasks(State(state): State<Arc<GatewayState>>) -> ApiResult<Json<TaskDocument>> {
    let tasks = blocking(state, |s| Ok(s.tasks.list())).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks: requires `title` and `description`.
pub async fn create_task(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = payload?;
    let task = blocking(state, move |s| Ok(s.tasks.create(input)?)).await?;
    Ok(Json(json!({ "success": true, "task": task })))
}

/// PUT /api/tasks/{task_id}
pub async fn update_task(
    State(state): State<Arc<GatewayState>>,
    Path(task_id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(patch) = payload?;
    let task = blocking(state, move |s| Ok(s.tasks.update(&task_id, patch)?)).await?;
    Ok(Json(json!({ "success": true, "task": task })))
}

/// DELETE /api/tasks/{task_id}
pub async fn delete_task(
    State(state): State<Arc<GatewayState>>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let task_id = blocking(state, move |s| Ok(s.tasks.delete(&task_id)?)).await?;
    Ok(Json(json!({ "success": true, "taskId": task_id })))
}

/// GET /api/settings: the settings object itself, not wrapped.
pub async fn get_settings(State(state): State<Arc<GatewayState>>) -> ApiResult<Json<Settings>> {
    let settings = blocking(state, |s| Ok(s.settings.get())).await?;
    Ok(Json(settings))
}

/// PUT /api/settings: namespaces in the body replace stored ones wholesale.
pub async fn update_settings(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<Settings>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(patch) = payload?;
    let settings = blocking(state, move |s| Ok(s.settings.update(patch)?)).await?;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

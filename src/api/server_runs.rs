//! Provider run handlers.

use actix_web::{get, post, web, HttpResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::server_run;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateServerRunRequest, PostmanTestResultResponse, ResultStatus, RunStatus, ServerRunResponse,
};
use crate::services::{postman, runner, ArtifactStore};

use super::scenarios::resolve_endpoint_values;

async fn run_response(pool: &DbPool, run: server_run::Model) -> AppResult<ServerRunResponse> {
    let scenario = pool
        .get_scenario_by_id(run.test_scenario_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;
    let environment = pool
        .get_environment_by_id(run.environment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Environment".to_string()))?;

    Ok(ServerRunResponse {
        id: run.id,
        test_scenario: scenario.name,
        environment: environment.name,
        started_at: run.started_at,
        stopped_at: run.stopped_at,
        status: RunStatus::parse(&run.status).unwrap_or(RunStatus::Starting),
        percentage_exec: run.percentage_exec,
        status_exec: run.status_exec,
        scheduled: run.scheduled,
        build_version: run.build_version,
    })
}

/// Start a provider run.
///
/// Persists the run with status `starting` and dispatches execution
/// out-of-band; poll the run to observe completion.
#[utoipa::path(
    post,
    path = "/api/v1/provider/runs",
    tag = "Provider",
    request_body = CreateServerRunRequest,
    responses(
        (status = 201, description = "Run created and dispatched", body = ServerRunResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Scenario or environment not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/provider/runs")]
pub async fn create_run(
    pool: web::Data<DbPool>,
    artifacts: web::Data<ArtifactStore>,
    body: web::Json<CreateServerRunRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let scenario = pool
        .get_scenario_by_name(&req.test_scenario)
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    if !scenario.active {
        return Err(AppError::InvalidInput(format!(
            "Test scenario {} is not active",
            scenario.name
        )));
    }

    let environment = pool
        .get_environment_by_name(scenario.id, &req.environment)
        .await?
        .ok_or_else(|| AppError::NotFound("Environment".to_string()))?;

    // Validate endpoint names before anything is persisted.
    let endpoints = resolve_endpoint_values(&pool, scenario.id, &req.endpoints).await?;

    let run = pool
        .insert_server_run(scenario.id, environment.id, None, false, req.build_version)
        .await?;
    pool.insert_run_endpoints(run.id, endpoints).await?;

    info!("Created provider run {} for scenario {}", run.id, scenario.name);

    // Fire-and-forget; the run's status field tracks progress.
    runner::dispatch_run(
        pool.get_ref().clone(),
        artifacts.get_ref().clone(),
        run.id,
    );

    let response = run_response(&pool, run).await?;
    Ok(HttpResponse::Created().json(response))
}

/// List provider runs, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/provider/runs",
    tag = "Provider",
    responses(
        (status = 200, description = "Runs", body = [ServerRunResponse]),
    )
)]
#[get("/provider/runs")]
pub async fn list_runs(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let runs = pool.list_server_runs().await?;

    let mut response = Vec::with_capacity(runs.len());
    for run in runs {
        response.push(run_response(&pool, run).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Get one provider run.
#[utoipa::path(
    get,
    path = "/api/v1/provider/runs/{id}",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run", body = ServerRunResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/provider/runs/{id}")]
pub async fn get_run(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let run = pool
        .get_server_run_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Server run".to_string()))?;

    let response = run_response(&pool, run).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Get a run's per-collection results with recomputed aggregates.
///
/// The aggregate summary is derived from the stored JSON log on every read;
/// log paths are echoed only when the scenario publishes its logs.
#[utoipa::path(
    get,
    path = "/api/v1/provider/runs/{id}/results",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Results", body = [PostmanTestResultResponse]),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/provider/runs/{id}/results")]
pub async fn get_run_results(
    pool: web::Data<DbPool>,
    artifacts: web::Data<ArtifactStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    let run = pool
        .get_server_run_by_id(run_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Server run".to_string()))?;

    let scenario = pool
        .get_scenario_by_id(run.test_scenario_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;
    let collections = pool.get_scenario_collections(run.test_scenario_id).await?;

    let results = pool.get_run_results(run_id).await?;
    let mut response = Vec::with_capacity(results.len());
    for result in results {
        let collection_name = collections
            .iter()
            .find(|c| c.id == result.postman_test_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let aggregate = match &result.log_json_path {
            Some(path) => match artifacts.read_to_string(path).await {
                Ok(content) => postman::parse_execution_log(&content)
                    .map(|calls| postman::aggregate_results(&calls))
                    .ok(),
                Err(e) => {
                    warn!("Failed to read log {}: {}", path, e);
                    None
                }
            },
            None => None,
        };

        let (log_json, log_html) = if scenario.public_logs {
            (result.log_json_path.clone(), result.log_html_path.clone())
        } else {
            (None, None)
        };

        response.push(PostmanTestResultResponse {
            id: result.id,
            postman_test: collection_name,
            status: result.status.as_deref().and_then(ResultStatus::parse),
            aggregate,
            log_json,
            log_html,
        });
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Configure provider run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_run)
        .service(list_runs)
        .service(get_run)
        .service(get_run_results);
}

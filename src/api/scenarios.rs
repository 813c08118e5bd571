//! Provider scenario configuration handlers: scenarios, collections,
//! environments and schedules.

use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use futures_util::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::db::server_runs::NewEndpoint;
use crate::db::DbPool;
use crate::entity::environment;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateEnvironmentRequest, CreateScenarioRequest, CreateScheduleRequest, EndpointValue,
    EnvironmentResponse, PostmanTestResponse, ScenarioResponse, ScheduleResponse,
};
use crate::services::runner::Collection;
use crate::services::ArtifactStore;

/// Resolve endpoint values against a scenario's declared variables.
///
/// Every supplied name must match a variable; a mismatch is a client error.
pub async fn resolve_endpoint_values(
    pool: &DbPool,
    scenario_id: Uuid,
    endpoints: &[EndpointValue],
) -> AppResult<Vec<NewEndpoint>> {
    let variables = pool.get_scenario_variables(scenario_id).await?;

    let mut resolved = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let variable = variables
            .iter()
            .find(|v| v.name == endpoint.name)
            .ok_or_else(|| {
                AppError::InvalidInput("The urls names provided do not match".to_string())
            })?;
        resolved.push(NewEndpoint {
            scenario_variable_id: variable.id,
            url: endpoint.url.clone(),
        });
    }

    Ok(resolved)
}

async fn scenario_response(
    pool: &DbPool,
    scenario: crate::entity::test_scenario::Model,
) -> AppResult<ScenarioResponse> {
    let variables = pool.get_scenario_variables(scenario.id).await?;
    Ok(ScenarioResponse {
        id: scenario.id,
        name: scenario.name,
        description: scenario.description,
        active: scenario.active,
        public_logs: scenario.public_logs,
        variables: variables.into_iter().map(|v| v.name).collect(),
        created_at: scenario.created_at,
    })
}

async fn environment_response(
    pool: &DbPool,
    environment: environment::Model,
) -> AppResult<EnvironmentResponse> {
    let runs = pool.get_environment_runs(environment.id).await?;
    let last_started_at = runs.first().map(|r| r.started_at);
    let last_run = runs.iter().find_map(|r| r.stopped_at);

    Ok(EnvironmentResponse {
        id: environment.id,
        name: environment.name,
        supplier_name: environment.supplier_name,
        software_product: environment.software_product,
        product_role: environment.product_role,
        last_run,
        last_started_at,
    })
}

/// Create a test scenario with its declared variables.
#[utoipa::path(
    post,
    path = "/api/v1/provider/scenarios",
    tag = "Provider",
    request_body = CreateScenarioRequest,
    responses(
        (status = 201, description = "Scenario created", body = ScenarioResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
#[post("/provider/scenarios")]
pub async fn create_scenario(
    pool: web::Data<DbPool>,
    body: web::Json<CreateScenarioRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }

    let (scenario, _variables) = pool
        .insert_test_scenario(
            req.name,
            req.description,
            req.active.unwrap_or(true),
            req.public_logs.unwrap_or(true),
            req.variables,
        )
        .await?;

    info!("Created test scenario {} ({})", scenario.name, scenario.id);
    let response = scenario_response(&pool, scenario).await?;
    Ok(HttpResponse::Created().json(response))
}

/// List test scenarios.
#[utoipa::path(
    get,
    path = "/api/v1/provider/scenarios",
    tag = "Provider",
    responses(
        (status = 200, description = "Scenarios", body = [ScenarioResponse]),
    )
)]
#[get("/provider/scenarios")]
pub async fn list_scenarios(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let scenarios = pool.list_scenarios().await?;

    let mut response = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        response.push(scenario_response(&pool, scenario).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Get one scenario.
#[utoipa::path(
    get,
    path = "/api/v1/provider/scenarios/{id}",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    responses(
        (status = 200, description = "Scenario", body = ScenarioResponse),
        (status = 404, description = "Scenario not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/provider/scenarios/{id}")]
pub async fn get_scenario(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let scenario = pool
        .get_scenario_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let response = scenario_response(&pool, scenario).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Upload a collection file for a scenario.
///
/// Multipart form: a `collection` file field plus `name`, `version` and
/// optional `published_url` text fields. The file must parse as a collection
/// before it is accepted.
#[utoipa::path(
    post,
    path = "/api/v1/provider/scenarios/{id}/collections",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    responses(
        (status = 201, description = "Collection stored", body = PostmanTestResponse),
        (status = 400, description = "Invalid collection", body = crate::error::ErrorResponse),
        (status = 404, description = "Scenario not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/provider/scenarios/{id}/collections")]
pub async fn upload_collection(
    pool: web::Data<DbPool>,
    artifacts: web::Data<ArtifactStore>,
    max_collection_size: web::Data<usize>,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let scenario = pool
        .get_scenario_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let mut name: Option<String> = None;
    let mut version = "1.0.0".to_string();
    let mut published_url: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > **max_collection_size {
                return Err(AppError::InvalidInput(format!(
                    "Collection exceeds the maximum size of {} bytes",
                    **max_collection_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        match field_name.as_str() {
            "collection" => content = Some(data),
            "name" => name = Some(String::from_utf8_lossy(&data).trim().to_string()),
            "version" => version = String::from_utf8_lossy(&data).trim().to_string(),
            "published_url" => {
                published_url = Some(String::from_utf8_lossy(&data).trim().to_string())
            }
            _ => {}
        }
    }

    let content = content
        .ok_or_else(|| AppError::InvalidInput("Missing collection file field".to_string()))?;

    // Validate the file before storing it. Variable tokens are legal in a
    // stored collection, so strip them for the parse check only.
    let parse_check = String::from_utf8_lossy(&content)
        .replace("{{", "")
        .replace("}}", "");
    serde_json::from_str::<Collection>(&parse_check)
        .map_err(|e| AppError::InvalidInput(format!("Not a valid collection file: {}", e)))?;

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing name field".to_string()))?;

    let relative = artifacts.save_collection(&content).await?;
    let collection = pool
        .insert_postman_test(scenario.id, name, version, Some(relative), published_url)
        .await?;

    info!(
        "Stored collection {} v{} for scenario {}",
        collection.name, collection.version, scenario.name
    );

    Ok(HttpResponse::Created().json(PostmanTestResponse {
        id: collection.id,
        name: collection.name,
        version: collection.version,
        filename: collection
            .collection_path
            .as_deref()
            .and_then(|p| p.rsplit('/').next().map(str::to_string)),
        published_url: collection.published_url,
        sequence: collection.sequence,
    }))
}

/// List a scenario's collections in execution order.
#[utoipa::path(
    get,
    path = "/api/v1/provider/scenarios/{id}/collections",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    responses(
        (status = 200, description = "Collections", body = [PostmanTestResponse]),
        (status = 404, description = "Scenario not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/provider/scenarios/{id}/collections")]
pub async fn list_collections(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let scenario_id = path.into_inner();
    pool.get_scenario_by_id(scenario_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let collections = pool.get_scenario_collections(scenario_id).await?;
    let response: Vec<PostmanTestResponse> = collections
        .into_iter()
        .map(|c| PostmanTestResponse {
            id: c.id,
            name: c.name,
            version: c.version,
            filename: c
                .collection_path
                .as_deref()
                .and_then(|p| p.rsplit('/').next().map(str::to_string)),
            published_url: c.published_url,
            sequence: c.sequence,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Create an environment for a scenario.
#[utoipa::path(
    post,
    path = "/api/v1/provider/scenarios/{id}/environments",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    request_body = CreateEnvironmentRequest,
    responses(
        (status = 201, description = "Environment created", body = EnvironmentResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Scenario not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/provider/scenarios/{id}/environments")]
pub async fn create_environment(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreateEnvironmentRequest>,
) -> AppResult<HttpResponse> {
    let scenario = pool
        .get_scenario_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let req = body.into_inner();
    let endpoints = resolve_endpoint_values(&pool, scenario.id, &req.endpoints).await?;

    let environment = pool
        .insert_environment(
            scenario.id,
            req.name,
            req.supplier_name,
            req.software_product,
            req.product_role,
        )
        .await?;
    pool.insert_environment_endpoints(environment.id, endpoints)
        .await?;

    let response = environment_response(&pool, environment).await?;
    Ok(HttpResponse::Created().json(response))
}

/// List a scenario's environments.
#[utoipa::path(
    get,
    path = "/api/v1/provider/scenarios/{id}/environments",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    responses(
        (status = 200, description = "Environments", body = [EnvironmentResponse]),
        (status = 404, description = "Scenario not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/provider/scenarios/{id}/environments")]
pub async fn list_environments(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let scenario_id = path.into_inner();
    pool.get_scenario_by_id(scenario_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let environments = pool.get_scenario_environments(scenario_id).await?;
    let mut response = Vec::with_capacity(environments.len());
    for environment in environments {
        response.push(environment_response(&pool, environment).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Schedule recurring runs for one of the scenario's environments.
#[utoipa::path(
    post,
    path = "/api/v1/provider/scenarios/{id}/schedules",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleResponse),
        (status = 404, description = "Scenario or environment not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/provider/scenarios/{id}/schedules")]
pub async fn create_schedule(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CreateScheduleRequest>,
) -> AppResult<HttpResponse> {
    let scenario = pool
        .get_scenario_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let req = body.into_inner();
    let environment = pool
        .get_environment_by_name(scenario.id, &req.environment)
        .await?
        .ok_or_else(|| AppError::NotFound("Environment".to_string()))?;

    let schedule = pool
        .insert_schedule(environment.id, req.active.unwrap_or(true))
        .await?;

    Ok(HttpResponse::Created().json(ScheduleResponse {
        id: schedule.id,
        environment: environment.name,
        active: schedule.active,
        last_run: None,
    }))
}

/// List a scenario's schedules.
#[utoipa::path(
    get,
    path = "/api/v1/provider/scenarios/{id}/schedules",
    tag = "Provider",
    params(("id" = Uuid, Path, description = "Scenario ID")),
    responses(
        (status = 200, description = "Schedules", body = [ScheduleResponse]),
        (status = 404, description = "Scenario not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/provider/scenarios/{id}/schedules")]
pub async fn list_schedules(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let scenario_id = path.into_inner();
    pool.get_scenario_by_id(scenario_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test scenario".to_string()))?;

    let schedules = pool.get_scenario_schedules(scenario_id).await?;
    let mut response = Vec::with_capacity(schedules.len());
    for (schedule, environment) in schedules {
        let runs = pool.get_environment_runs(environment.id).await?;
        let last_run = runs
            .iter()
            .filter(|r| r.scheduled)
            .find_map(|r| r.stopped_at);
        response.push(ScheduleResponse {
            id: schedule.id,
            environment: environment.name,
            active: schedule.active,
            last_run,
        });
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Configure provider scenario routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_scenario)
        .service(list_scenarios)
        .service(get_scenario)
        .service(upload_collection)
        .service(list_collections)
        .service(create_environment)
        .service(list_environments)
        .service(create_schedule)
        .service(list_schedules);
}

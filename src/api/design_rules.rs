//! Design-rule API handlers.

use actix_web::{get, post, web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::{rule_result, rule_session};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateTestSuiteRequest, RuleResultResponse, RuleType, SessionDetailResponse,
    StartSessionRequest, TestSuiteDetailResponse, TestSuiteSummary, TestVersionResponse,
};
use crate::services::design_rules;

fn result_response(result: &rule_result::Model) -> RuleResultResponse {
    let rule_type = RuleType::parse(&result.rule_type).unwrap_or(RuleType::Api03);
    RuleResultResponse {
        rule_type,
        title: rule_type.title().to_string(),
        success: result.success,
        errors: result.errors.clone(),
    }
}

fn session_response(
    session: &rule_session::Model,
    results: &[rule_result::Model],
) -> SessionDetailResponse {
    SessionDetailResponse {
        id: session.id,
        test_suite_id: session.test_suite_id,
        test_version_id: session.test_version_id,
        started_at: session.started_at,
        successful: design_rules::session_successful(results),
        percentage_score: design_rules::percentage_score(results),
        results: results.iter().map(result_response).collect(),
    }
}

/// Register a test suite.
#[utoipa::path(
    post,
    path = "/api/v1/design-rules/suites",
    tag = "Design rules",
    request_body = CreateTestSuiteRequest,
    responses(
        (status = 201, description = "Suite registered", body = TestSuiteSummary),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
#[post("/design-rules/suites")]
pub async fn create_suite(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestSuiteRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }
    if !req.api_endpoint.starts_with("http://") && !req.api_endpoint.starts_with("https://") {
        return Err(AppError::InvalidInput(
            "api_endpoint must be an http(s) URL".to_string(),
        ));
    }

    let suite = pool.insert_test_suite(req.name, req.api_endpoint).await?;
    info!("Registered test suite {} ({})", suite.id, suite.api_endpoint);

    Ok(HttpResponse::Created().json(TestSuiteSummary {
        id: suite.id,
        name: suite.name,
        api_endpoint: suite.api_endpoint,
        created_at: suite.created_at,
    }))
}

/// List registered test suites.
#[utoipa::path(
    get,
    path = "/api/v1/design-rules/suites",
    tag = "Design rules",
    responses(
        (status = 200, description = "Suites", body = [TestSuiteSummary]),
    )
)]
#[get("/design-rules/suites")]
pub async fn list_suites(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let suites = pool.list_test_suites().await?;

    let response: Vec<TestSuiteSummary> = suites
        .into_iter()
        .map(|suite| TestSuiteSummary {
            id: suite.id,
            name: suite.name,
            api_endpoint: suite.api_endpoint,
            created_at: suite.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a suite with its sessions and aggregate score.
///
/// `successful` and `percentage_score` evaluate the latest session; a suite
/// without sessions scores false / 0.00.
#[utoipa::path(
    get,
    path = "/api/v1/design-rules/suites/{id}",
    tag = "Design rules",
    params(("id" = Uuid, Path, description = "Suite ID")),
    responses(
        (status = 200, description = "Suite detail", body = TestSuiteDetailResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/design-rules/suites/{id}")]
pub async fn get_suite(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let suite = pool
        .get_test_suite_by_id(suite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test suite".to_string()))?;

    let sessions = pool.get_suite_sessions(suite_id).await?;
    let mut session_responses = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let results = pool.get_session_results(session.id).await?;
        session_responses.push(session_response(session, &results));
    }

    // Sessions are newest-first; the latest one carries the suite score.
    let (successful, percentage_score) = session_responses
        .first()
        .map(|s| (s.successful, s.percentage_score))
        .unwrap_or((false, 0.0));

    Ok(HttpResponse::Ok().json(TestSuiteDetailResponse {
        id: suite.id,
        name: suite.name,
        api_endpoint: suite.api_endpoint,
        created_at: suite.created_at,
        successful,
        percentage_score,
        sessions: session_responses,
    }))
}

/// Start an evaluation session for a suite.
///
/// Fetches the suite's endpoint document and evaluates every rule enabled in
/// the requested version, synchronously within this request.
#[utoipa::path(
    post,
    path = "/api/v1/design-rules/suites/{id}/sessions",
    tag = "Design rules",
    params(("id" = Uuid, Path, description = "Suite ID")),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session evaluated", body = SessionDetailResponse),
        (status = 404, description = "Suite or version not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/design-rules/suites/{id}/sessions")]
pub async fn start_session(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<StartSessionRequest>,
) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let suite = pool
        .get_test_suite_by_id(suite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test suite".to_string()))?;

    let version = pool
        .get_test_version(body.into_inner().test_version_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test version".to_string()))?;

    let (session, results) = design_rules::start_session(&pool, &suite, &version).await?;

    Ok(HttpResponse::Created().json(session_response(&session, &results)))
}

/// Get one evaluation session with its results.
#[utoipa::path(
    get,
    path = "/api/v1/design-rules/sessions/{id}",
    tag = "Design rules",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session detail", body = SessionDetailResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/design-rules/sessions/{id}")]
pub async fn get_session(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let session = pool
        .get_rule_session_by_id(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

    let results = pool.get_session_results(session_id).await?;

    Ok(HttpResponse::Ok().json(session_response(&session, &results)))
}

/// List rule-set versions and their enabled rules.
#[utoipa::path(
    get,
    path = "/api/v1/design-rules/versions",
    tag = "Design rules",
    responses(
        (status = 200, description = "Versions", body = [TestVersionResponse]),
    )
)]
#[get("/design-rules/versions")]
pub async fn list_versions(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let versions = pool.list_test_versions().await?;

    let response: Vec<TestVersionResponse> = versions
        .into_iter()
        .map(|(version, options)| TestVersionResponse {
            id: version.id,
            name: version.name,
            version: version.version,
            rule_types: options
                .iter()
                .filter_map(|o| RuleType::parse(&o.rule_type))
                .collect(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Configure design-rule routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_suite)
        .service(list_suites)
        .service(get_suite)
        .service(start_session)
        .service(get_session)
        .service(list_versions);
}

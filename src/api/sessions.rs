//! Capture session handlers and the runtime proxy.

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::session;
use crate::error::{AppError, AppResult};
use crate::models::{
    CallOutcome, CreateSessionRequest, CreateSessionTypeRequest, ExposedUrlResponse,
    ReportEntryResponse, ScenarioCaseSummary, SessionLogResponse, SessionResponse, SessionStatus,
    SessionTypeResponse,
};
use crate::services::capture;

/// HTTP methods a scenario case may declare.
const CASE_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Request headers never forwarded to the target backend.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
];

async fn session_response(pool: &DbPool, session: session::Model) -> AppResult<SessionResponse> {
    let session_type = pool
        .get_session_type_by_id(session.session_type_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session type".to_string()))?;

    let exposed = pool.get_session_exposed_urls(session.id).await?;
    let mut exposed_urls = Vec::with_capacity(exposed.len());
    for url in exposed {
        let config = pool
            .get_endpoint_config_by_id(url.endpoint_config_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Endpoint config".to_string()))?;
        exposed_urls.push(ExposedUrlResponse {
            name: config.name,
            subpath: url.subpath,
        });
    }

    Ok(SessionResponse {
        id: session.id,
        name: session.name,
        session_type: session_type.name,
        status: SessionStatus::parse(&session.status).unwrap_or(SessionStatus::Starting),
        started_at: session.started_at,
        stopped_at: session.stopped_at,
        build_version: session.build_version,
        exposed_urls,
    })
}

async fn session_type_response(
    pool: &DbPool,
    session_type: crate::entity::session_type::Model,
) -> AppResult<SessionTypeResponse> {
    let endpoints = pool.get_endpoint_configs(session_type.id).await?;
    let cases = pool.get_scenario_cases(session_type.id).await?;

    Ok(SessionTypeResponse {
        id: session_type.id,
        name: session_type.name,
        standard: session_type.standard,
        role: session_type.role,
        application: session_type.application,
        version: session_type.version,
        endpoints: endpoints.into_iter().map(|e| e.name).collect(),
        scenario_cases: cases
            .into_iter()
            .map(|c| ScenarioCaseSummary {
                http_method: c.http_method,
                url: c.url,
            })
            .collect(),
    })
}

/// Create a session type with its endpoints and scenario cases.
#[utoipa::path(
    post,
    path = "/api/v1/session-types",
    tag = "Sessions",
    request_body = CreateSessionTypeRequest,
    responses(
        (status = 201, description = "Session type created", body = SessionTypeResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
#[post("/session-types")]
pub async fn create_session_type(
    pool: web::Data<DbPool>,
    body: web::Json<CreateSessionTypeRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }
    for case in &req.scenario_cases {
        if !CASE_METHODS.contains(&case.http_method.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "{} is not a valid scenario case method",
                case.http_method
            )));
        }
    }

    let session_type = pool
        .insert_session_type(
            req.name,
            req.standard,
            req.role,
            req.application,
            req.version,
            req.endpoints,
            req.scenario_cases,
        )
        .await?;

    info!("Created session type {}", session_type.name);

    let response = session_type_response(&pool, session_type).await?;
    Ok(HttpResponse::Created().json(response))
}

/// List session types.
#[utoipa::path(
    get,
    path = "/api/v1/session-types",
    tag = "Sessions",
    responses(
        (status = 200, description = "Session types", body = [SessionTypeResponse]),
    )
)]
#[get("/session-types")]
pub async fn list_session_types(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let session_types = pool.list_session_types().await?;

    let mut response = Vec::with_capacity(session_types.len());
    for session_type in session_types {
        response.push(session_type_response(&pool, session_type).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Start a capture session.
///
/// Exposes one proxy subpath per configured endpoint of the session type.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session started", body = SessionResponse),
        (status = 404, description = "Session type not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/sessions")]
pub async fn create_session(
    pool: web::Data<DbPool>,
    body: web::Json<CreateSessionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session_type = pool
        .get_session_type_by_name(&req.session_type)
        .await?
        .ok_or_else(|| AppError::NotFound("Session type".to_string()))?;

    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| {
            let token = Uuid::new_v4().simple().to_string();
            format!("s-{}", &token[..8])
        });

    let session = pool
        .insert_session(session_type.id, name, req.build_version)
        .await?;

    for config in pool.get_endpoint_configs(session_type.id).await? {
        let subpath = Uuid::new_v4().simple().to_string();
        pool.insert_exposed_url(session.id, config.id, subpath)
            .await?;
    }

    info!(
        "Started capture session {} ({})",
        session.name, session_type.name
    );

    let response = session_response(&pool, session).await?;
    Ok(HttpResponse::Created().json(response))
}

/// List capture sessions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    responses(
        (status = 200, description = "Sessions", body = [SessionResponse]),
    )
)]
#[get("/sessions")]
pub async fn list_sessions(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let sessions = pool.list_sessions().await?;

    let mut response = Vec::with_capacity(sessions.len());
    for session in sessions {
        response.push(session_response(&pool, session).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Get one capture session.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = SessionResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/sessions/{id}")]
pub async fn get_session(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let session = pool
        .get_session_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

    let response = session_response(&pool, session).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Stop a capture session.
///
/// Scenario cases no captured call matched get a `not_called` report, so the
/// session's report covers every case afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/stop",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session stopped", body = SessionResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/sessions/{id}/stop")]
pub async fn stop_session(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let session = pool
        .get_session_by_id(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

    let stopped = pool.stop_session(session.id).await?;

    let cases = pool.get_scenario_cases(stopped.session_type_id).await?;
    let reports = pool.get_session_reports(session_id).await?;
    for case in cases {
        let already_reported = reports.iter().any(|r| r.scenario_case_id == case.id);
        if !already_reported {
            pool.insert_report(session_id, case.id, None, CallOutcome::NotCalled)
                .await?;
        }
    }

    info!("Stopped capture session {}", stopped.name);

    let response = session_response(&pool, stopped).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Get a session's per-case report.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/report",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Per-case outcomes", body = [ReportEntryResponse]),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/sessions/{id}/report")]
pub async fn get_session_report(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let session = pool
        .get_session_by_id(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

    let cases = pool.get_scenario_cases(session.session_type_id).await?;
    let reports = pool.get_session_reports(session_id).await?;

    let response: Vec<ReportEntryResponse> = cases
        .into_iter()
        .map(|case| {
            // The latest report for the case wins; absent means not called yet.
            let result = reports
                .iter()
                .filter(|r| r.scenario_case_id == case.id)
                .max_by_key(|r| r.created_at)
                .and_then(|r| CallOutcome::parse(&r.result))
                .unwrap_or(CallOutcome::NotCalled);
            ReportEntryResponse {
                http_method: case.http_method,
                url: case.url,
                result,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a session's captured calls.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/logs",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Captured calls", body = [SessionLogResponse]),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/sessions/{id}/logs")]
pub async fn get_session_logs(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    pool.get_session_by_id(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

    let logs = pool.get_session_logs(session_id).await?;
    let response: Vec<SessionLogResponse> = logs
        .into_iter()
        .map(|log| {
            let request = log.request.as_ref().map(|r| &r["request"]);
            SessionLogResponse {
                id: log.id,
                date: log.date,
                request_method: request
                    .and_then(|r| r["method"].as_str())
                    .map(str::to_string),
                request_path: request.and_then(|r| r["path"].as_str()).map(str::to_string),
                response_status: log.response_status,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// The capture proxy: forward an inbound call to the session's target
/// backend, record it, and score it against the session type's cases.
pub async fn proxy_call(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let (subpath, tail) = path.into_inner();

    let exposed = pool
        .get_exposed_url_by_subpath(&subpath)
        .await?
        .ok_or_else(|| AppError::NotFound("Exposed url".to_string()))?;

    let session = pool
        .get_session_by_id(exposed.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session".to_string()))?;
    if SessionStatus::parse(&session.status) == Some(SessionStatus::Stopped) {
        return Err(AppError::InvalidInput(
            "The session has been stopped".to_string(),
        ));
    }

    let config = pool
        .get_endpoint_config_by_id(exposed.endpoint_config_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Endpoint config".to_string()))?;

    let target = format!("{}/{}", config.target_url.trim_end_matches('/'), tail);
    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|_| AppError::InvalidInput("Unsupported HTTP method".to_string()))?;

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .filter(|(name, _)| {
            !HOP_BY_HOP_HEADERS.contains(&name.as_str().to_ascii_lowercase().as_str())
        })
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    let mut upstream = reqwest::Client::new().request(method, &target);
    for (name, value) in &headers {
        upstream = upstream.header(name.as_str(), value.as_str());
    }
    let upstream = upstream.body(body.to_vec()).send().await?;

    let status = upstream.status().as_u16();
    let content_type = upstream
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let response_body = upstream.text().await.unwrap_or_default();

    let call_path = format!("/{}", tail);
    let request_record = capture::request_record(
        req.method().as_str(),
        &call_path,
        &headers,
        &String::from_utf8_lossy(&body),
    );
    let response_record = capture::response_record(status, &response_body);

    let log = pool
        .insert_session_log(
            session.id,
            Some(request_record),
            Some(response_record),
            Some(status as i32),
        )
        .await?;

    let cases = pool.get_scenario_cases(session.session_type_id).await?;
    match capture::match_case(&cases, req.method().as_str(), &call_path) {
        Some(case) => {
            pool.insert_report(
                session.id,
                case.id,
                Some(log.id),
                capture::classify_response(status),
            )
            .await?;
        }
        None => {
            warn!(
                "No scenario case matched {} {} for session {}",
                req.method(),
                call_path,
                session.name
            );
        }
    }

    let status_code = actix_web::http::StatusCode::from_u16(status)
        .unwrap_or(actix_web::http::StatusCode::BAD_GATEWAY);
    Ok(HttpResponse::build(status_code)
        .content_type(content_type)
        .body(response_body))
}

/// Configure capture session routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_session_type)
        .service(list_session_types)
        .service(create_session)
        .service(list_sessions)
        .service(get_session)
        .service(stop_session)
        .service(get_session_report)
        .service(get_session_logs);
}

/// Configure the runtime proxy route (registered outside /api/v1).
pub fn configure_runtime_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/runtime/{subpath}/{tail:.*}").route(web::route().to(proxy_call)),
    );
}

//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "API Conformance Server",
        version = "0.3.0",
        description = "Conformance-testing platform for HTTP APIs: design-rule checks against introspection documents, scripted provider runs and scenario-based session capture"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Design-rule endpoints
        api::design_rules::create_suite,
        api::design_rules::list_suites,
        api::design_rules::get_suite,
        api::design_rules::start_session,
        api::design_rules::get_session,
        api::design_rules::list_versions,
        // Provider scenario endpoints
        api::scenarios::create_scenario,
        api::scenarios::list_scenarios,
        api::scenarios::get_scenario,
        api::scenarios::upload_collection,
        api::scenarios::list_collections,
        api::scenarios::create_environment,
        api::scenarios::list_environments,
        api::scenarios::create_schedule,
        api::scenarios::list_schedules,
        // Provider run endpoints
        api::server_runs::create_run,
        api::server_runs::list_runs,
        api::server_runs::get_run,
        api::server_runs::get_run_results,
        // Capture session endpoints
        api::sessions::create_session_type,
        api::sessions::list_session_types,
        api::sessions::create_session,
        api::sessions::list_sessions,
        api::sessions::get_session,
        api::sessions::stop_session,
        api::sessions::get_session_report,
        api::sessions::get_session_logs,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Design rules
            models::rule::RuleType,
            models::CreateTestSuiteRequest,
            models::StartSessionRequest,
            models::RuleResultResponse,
            models::SessionDetailResponse,
            models::TestSuiteSummary,
            models::TestSuiteDetailResponse,
            models::TestVersionResponse,
            // Provider
            models::provider::RunStatus,
            models::provider::ResultStatus,
            models::ScenarioVariableSpec,
            models::CreateScenarioRequest,
            models::ScenarioResponse,
            models::PostmanTestResponse,
            models::CreateEnvironmentRequest,
            models::EnvironmentResponse,
            models::EndpointValue,
            models::CreateServerRunRequest,
            models::ServerRunResponse,
            models::CreateScheduleRequest,
            models::ScheduleResponse,
            models::AssertionTotals,
            models::CallTotals,
            models::AggregateResults,
            models::PostmanTestResultResponse,
            // Sessions
            models::testsession::SessionStatus,
            models::testsession::CallOutcome,
            models::EndpointConfigSpec,
            models::ScenarioCaseSpec,
            models::ScenarioCaseSummary,
            models::CreateSessionTypeRequest,
            models::SessionTypeResponse,
            models::CreateSessionRequest,
            models::ExposedUrlResponse,
            models::SessionResponse,
            models::ReportEntryResponse,
            models::SessionLogResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Design rules", description = "Design-rule conformance checks"),
        (name = "Provider", description = "Scripted provider runs"),
        (name = "Sessions", description = "Scenario-based session capture"),
    )
)]
pub struct ApiDoc;

//! Design-rule DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::rule::RuleType;

/// Request to register a test suite.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTestSuiteRequest {
    pub name: String,
    /// The API endpoint the introspection document is fetched from.
    pub api_endpoint: String,
}

/// Request to start an evaluation session for a suite.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Rule-set version to evaluate; the default version when omitted.
    #[serde(default)]
    pub test_version_id: Option<Uuid>,
}

/// One rule's outcome within a session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RuleResultResponse {
    pub rule_type: RuleType,
    /// Human-readable rule title.
    pub title: String,
    pub success: bool,
    /// Error lines joined by newline; empty on success.
    pub errors: String,
}

/// Session detail, including its results in evaluation order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDetailResponse {
    pub id: Uuid,
    pub test_suite_id: Uuid,
    pub test_version_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// True iff the session has results and all of them succeeded.
    pub successful: bool,
    /// Successful results over total results, two decimals.
    pub percentage_score: f64,
    pub results: Vec<RuleResultResponse>,
}

/// Suite summary for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestSuiteSummary {
    pub id: Uuid,
    pub name: String,
    pub api_endpoint: String,
    pub created_at: DateTime<Utc>,
}

/// Suite detail including aggregate scores over its latest session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestSuiteDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub api_endpoint: String,
    pub created_at: DateTime<Utc>,
    /// False when no session exists.
    pub successful: bool,
    /// 0.00 when no session exists.
    pub percentage_score: f64,
    pub sessions: Vec<SessionDetailResponse>,
}

/// Rule-set version with its enabled rules in evaluation order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestVersionResponse {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub rule_types: Vec<RuleType>,
}

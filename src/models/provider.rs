//! Provider-run DTOs and status enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Provider run status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Starting,
    Running,
    Stopped,
    ErrorDeploy,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::ErrorDeploy => "error_deploy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starting" => Some(Self::Starting),
            "running" => Some(Self::Running),
            "stopped" => Some(Self::Stopped),
            "error_deploy" => Some(Self::ErrorDeploy),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-collection execution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    Failed,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Variable declared when creating a scenario.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScenarioVariableSpec {
    pub name: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Single-line input when true (default), multi-line otherwise.
    #[serde(default)]
    pub single_line: Option<bool>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

/// Request to create a test scenario.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateScenarioRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub public_logs: Option<bool>,
    #[serde(default)]
    pub variables: Vec<ScenarioVariableSpec>,
}

/// Scenario representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScenarioResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub public_logs: bool,
    pub variables: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored collection representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostmanTestResponse {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    /// Original filename of the stored collection, if any.
    pub filename: Option<String>,
    pub published_url: Option<String>,
    pub sequence: i32,
}

/// Request to create an environment for a scenario.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEnvironmentRequest {
    pub name: String,
    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub software_product: String,
    #[serde(default)]
    pub product_role: String,
    /// Variable values bound to this environment.
    #[serde(default)]
    pub endpoints: Vec<EndpointValue>,
}

/// Environment representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnvironmentResponse {
    pub id: Uuid,
    pub name: String,
    pub supplier_name: String,
    pub software_product: String,
    pub product_role: String,
    /// Stop time of the most recent finished run.
    pub last_run: Option<DateTime<Utc>>,
    /// Start time of the most recent run.
    pub last_started_at: Option<DateTime<Utc>>,
}

/// A named variable value supplied for a run or environment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EndpointValue {
    /// Scenario variable name this value binds.
    pub name: String,
    pub url: String,
}

/// Request to start a provider run.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateServerRunRequest {
    /// Scenario, referenced by name.
    pub test_scenario: String,
    /// Environment, referenced by name within the scenario.
    pub environment: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointValue>,
    #[serde(default)]
    pub build_version: String,
}

/// Provider run representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServerRunResponse {
    pub id: Uuid,
    pub test_scenario: String,
    pub environment: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub percentage_exec: Option<i32>,
    pub status_exec: Option<String>,
    pub scheduled: bool,
    pub build_version: String,
}

/// Request to schedule recurring runs for an environment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateScheduleRequest {
    /// Environment, referenced by name within the scenario.
    pub environment: String,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Schedule representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub environment: String,
    pub active: bool,
    /// Stop time of the most recent scheduled run.
    pub last_run: Option<DateTime<Utc>>,
}

/// Flattened per-assertion counts of one execution log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AssertionTotals {
    pub passed: u32,
    pub failed: u32,
    pub total: u32,
}

/// Flattened per-call counts of one execution log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CallTotals {
    pub success: u32,
    pub failed: u32,
    pub total: u32,
}

/// Aggregate summary of one execution log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AggregateResults {
    pub assertions: AssertionTotals,
    pub calls: CallTotals,
}

/// Per-collection result with its recomputed aggregate summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostmanTestResultResponse {
    pub id: Uuid,
    pub postman_test: String,
    pub status: Option<ResultStatus>,
    pub aggregate: Option<AggregateResults>,
    /// Artifact paths, served under /artifacts when the scenario has public logs.
    pub log_json: Option<String>,
    pub log_html: Option<String>,
}

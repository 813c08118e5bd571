//! Capture-session DTOs and status enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Capture session status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Starting,
    Running,
    Stopped,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starting" => Some(Self::Starting),
            "running" => Some(Self::Running),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tri-state outcome of one scenario case within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Success,
    Failed,
    NotCalled,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::NotCalled => "not_called",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "not_called" => Some(Self::NotCalled),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Endpoint configuration declared when creating a session type.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EndpointConfigSpec {
    pub name: String,
    /// Base URL inbound calls are forwarded to.
    pub target_url: String,
}

/// Scenario case declared when creating a session type.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScenarioCaseSpec {
    pub http_method: String,
    /// Path pattern; `{placeholder}` segments match any single non-empty segment.
    pub url: String,
}

/// Request to create a session type.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSessionTypeRequest {
    pub name: String,
    #[serde(default)]
    pub standard: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfigSpec>,
    #[serde(default)]
    pub scenario_cases: Vec<ScenarioCaseSpec>,
}

/// Session type representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub standard: Option<String>,
    pub role: Option<String>,
    pub application: Option<String>,
    pub version: Option<String>,
    pub endpoints: Vec<String>,
    pub scenario_cases: Vec<ScenarioCaseSummary>,
}

/// One declared scenario case.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScenarioCaseSummary {
    pub http_method: String,
    pub url: String,
}

/// Request to start a capture session.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Session type, referenced by name.
    pub session_type: String,
    /// Session name; generated when omitted.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub build_version: Option<String>,
}

/// Exposed proxy path for one configured endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExposedUrlResponse {
    /// Endpoint config name.
    pub name: String,
    /// Token under /runtime/{subpath}/... the proxy accepts calls on.
    pub subpath: String,
}

/// Capture session representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub session_type: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub build_version: Option<String>,
    pub exposed_urls: Vec<ExposedUrlResponse>,
}

/// One scenario case with its tri-state outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportEntryResponse {
    pub http_method: String,
    pub url: String,
    pub result: CallOutcome,
}

/// Captured call summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionLogResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub response_status: Option<i32>,
}

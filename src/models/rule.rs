//! Design-rule types shared by the evaluators and the persistence layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The battery of design rules this platform evaluates.
///
/// Identifiers follow the numbering of the published API design rules the
/// checks implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Only standard HTTP methods may be declared.
    Api03,
    /// The API publishes an OpenAPI Specification version 3 document.
    Api16,
    /// The URI carries the major version number, and only the major version.
    Api20,
    /// API endpoints do not end in a trailing slash.
    Api48,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api03 => "api_03",
            Self::Api16 => "api_16",
            Self::Api20 => "api_20",
            Self::Api48 => "api_48",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "api_03" => Some(Self::Api03),
            "api_16" => Some(Self::Api16),
            "api_20" => Some(Self::Api20),
            "api_48" => Some(Self::Api48),
            _ => None,
        }
    }

    /// Human-readable rule title, shown on result listings.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Api03 => "Only apply standard HTTP methods",
            Self::Api16 => "Use OAS 3.0 for documentation",
            Self::Api20 => "Include the major version number only in the URI",
            Self::Api48 => "Leave off trailing slashes from API endpoints",
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one rule evaluation: success iff no error lines were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub success: bool,
    /// Error lines in document traversal order.
    pub errors: Vec<String>,
}

impl RuleOutcome {
    /// A passing outcome with no errors.
    pub fn ok() -> Self {
        RuleOutcome {
            success: true,
            errors: Vec::new(),
        }
    }

    /// A failing outcome with a single message.
    pub fn fail(message: impl Into<String>) -> Self {
        RuleOutcome {
            success: false,
            errors: vec![message.into()],
        }
    }

    /// Build an outcome from collected error lines (empty list means success).
    pub fn from_errors(errors: Vec<String>) -> Self {
        RuleOutcome {
            success: errors.is_empty(),
            errors,
        }
    }

    /// The errors field as persisted: lines joined by newline, empty on success.
    pub fn errors_text(&self) -> String {
        self.errors.join("\n")
    }
}

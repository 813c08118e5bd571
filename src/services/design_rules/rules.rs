//! The design-rule evaluators.
//!
//! Each evaluator is a pure function over the endpoint URL or the fetched
//! introspection document. Malformed input is never an error here: it becomes
//! a failed outcome with a human-readable message.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::models::{RuleOutcome, RuleType};

/// Message returned by document-based rules when the endpoint body did not
/// parse as JSON (or the fetch produced no body at all).
pub const INVALID_JSON_MESSAGE: &str = "The API did not give a valid JSON output.";

/// Message for a URL without a recognizable version token.
pub const NO_VERSION_MESSAGE: &str = "The api endpoint does not contain a 'v*' in the url";

/// Message for a URL carrying minor/patch digits after the major version.
pub const MINOR_VERSION_MESSAGE: &str =
    "The api endpoint contains more than the major version number in the URI";

/// Message for a document that does not declare an OpenAPI 3 version.
pub const NO_OAS3_MESSAGE: &str =
    "The API does not provide an OpenAPI Specification version 3 document.";

/// Standard HTTP method names allowed as operation keys (case-sensitive).
const ALLOWED_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

/// A `v<digits>` token preceded by a path boundary.
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/v[0-9]+").expect("version token pattern is valid"));

/// Dispatch one rule against the endpoint URL and the parsed document.
pub fn evaluate(
    rule_type: RuleType,
    api_endpoint: &str,
    document: Option<&JsonValue>,
) -> RuleOutcome {
    match rule_type {
        RuleType::Api03 => evaluate_methods(document),
        RuleType::Api16 => evaluate_openapi_version(document),
        RuleType::Api20 => evaluate_version_in_uri(api_endpoint),
        RuleType::Api48 => evaluate_trailing_slashes(document),
    }
}

/// Rule api_03: every method key declared under `paths` must be a standard
/// HTTP method. A document without paths is trivially conformant.
pub fn evaluate_methods(document: Option<&JsonValue>) -> RuleOutcome {
    let Some(document) = document else {
        return RuleOutcome::fail(INVALID_JSON_MESSAGE);
    };

    let Some(paths) = document.get("paths").and_then(JsonValue::as_object) else {
        return RuleOutcome::ok();
    };

    let mut errors = Vec::new();
    for (path, operations) in paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        for method in operations.keys() {
            if !ALLOWED_METHODS.contains(&method.as_str()) {
                errors.push(format!(
                    "not supported method, {}, found for path {}",
                    method, path
                ));
            }
        }
    }

    RuleOutcome::from_errors(errors)
}

/// Rule api_16: the document must declare an OpenAPI Specification version 3.
pub fn evaluate_openapi_version(document: Option<&JsonValue>) -> RuleOutcome {
    let Some(document) = document else {
        return RuleOutcome::fail(INVALID_JSON_MESSAGE);
    };

    let declares_oas3 = document
        .get("openapi")
        .and_then(JsonValue::as_str)
        .is_some_and(|version| version == "3" || version.starts_with("3."));

    if declares_oas3 {
        RuleOutcome::ok()
    } else {
        RuleOutcome::fail(NO_OAS3_MESSAGE)
    }
}

/// Rule api_20: the URL must carry a standalone major version token.
///
/// A token only counts when `v<digits>` follows a `/` boundary and is
/// terminated by the end of the URL or another `/`. Digits after a `.` are
/// the distinct minor-version failure; any other fused character means no
/// token was recognized at all.
pub fn evaluate_version_in_uri(api_endpoint: &str) -> RuleOutcome {
    let mut minor_version_seen = false;

    for token in VERSION_TOKEN.find_iter(api_endpoint) {
        let rest = &api_endpoint[token.end()..];
        match rest.chars().next() {
            None | Some('/') => return RuleOutcome::ok(),
            Some('.') => {
                if rest[1..].chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    minor_version_seen = true;
                }
            }
            Some(_) => {}
        }
    }

    if minor_version_seen {
        RuleOutcome::fail(MINOR_VERSION_MESSAGE)
    } else {
        RuleOutcome::fail(NO_VERSION_MESSAGE)
    }
}

/// Rule api_48: no path declared under `paths` may end in a trailing slash.
pub fn evaluate_trailing_slashes(document: Option<&JsonValue>) -> RuleOutcome {
    let Some(document) = document else {
        return RuleOutcome::fail(INVALID_JSON_MESSAGE);
    };

    let Some(paths) = document.get("paths").and_then(JsonValue::as_object) else {
        return RuleOutcome::ok();
    };

    let mut errors = Vec::new();
    for path in paths.keys() {
        if path.len() > 1 && path.ends_with('/') {
            errors.push(format!("trailing slash found for path {}", path));
        }
    }

    RuleOutcome::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods_no_document() {
        let outcome = evaluate_methods(None);
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), INVALID_JSON_MESSAGE);
    }

    #[test]
    fn test_methods_no_paths_is_vacuously_successful() {
        let doc = json!({"openapi": "3.0.0"});
        let outcome = evaluate_methods(Some(&doc));
        assert!(outcome.success);
        assert_eq!(outcome.errors_text(), "");
    }

    #[test]
    fn test_methods_all_standard() {
        let doc = json!({
            "paths": {
                "/auth/login": {"post": {}, "get": {}},
                "/auth/logout": {"delete": {}, "head": {}, "options": {}}
            }
        });
        let outcome = evaluate_methods(Some(&doc));
        assert!(outcome.success);
        assert_eq!(outcome.errors_text(), "");
    }

    #[test]
    fn test_methods_violations_preserve_document_order() {
        let doc = json!({
            "paths": {
                "/auth/login": {"method": {}},
                "/auth/logout": {"getget": {}}
            }
        });
        let outcome = evaluate_methods(Some(&doc));
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors_text(),
            "not supported method, method, found for path /auth/login\n\
             not supported method, getget, found for path /auth/logout"
        );
    }

    #[test]
    fn test_methods_case_sensitive() {
        let doc = json!({"paths": {"/things": {"GET": {}}}});
        let outcome = evaluate_methods(Some(&doc));
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors_text(),
            "not supported method, GET, found for path /things"
        );
    }

    #[test]
    fn test_version_at_the_end() {
        let outcome = evaluate_version_in_uri("https://maykinmedia.nl/v1");
        assert!(outcome.success);
        assert_eq!(outcome.errors_text(), "");
    }

    #[test]
    fn test_version_in_the_path() {
        let outcome = evaluate_version_in_uri("https://maykinmedia.nl/v1/something");
        assert!(outcome.success);
        assert_eq!(outcome.errors_text(), "");
    }

    #[test]
    fn test_no_version() {
        let outcome = evaluate_version_in_uri("https://maykinmedia.nl/");
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), NO_VERSION_MESSAGE);
    }

    #[test]
    fn test_version_embedded_in_host_is_not_recognized() {
        let outcome = evaluate_version_in_uri("https://maykinmediav1.nl/something");
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), NO_VERSION_MESSAGE);
    }

    #[test]
    fn test_version_with_minor_version() {
        let outcome = evaluate_version_in_uri("https://maykinmedia.nl/v1.1");
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), MINOR_VERSION_MESSAGE);
    }

    #[test]
    fn test_version_with_trailing_text() {
        let outcome = evaluate_version_in_uri("https://maykinmedia.nl/v1test");
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), NO_VERSION_MESSAGE);
    }

    #[test]
    fn test_version_dot_without_digit_is_not_minor() {
        let outcome = evaluate_version_in_uri("https://maykinmedia.nl/v1.x");
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), NO_VERSION_MESSAGE);
    }

    #[test]
    fn test_openapi_version_accepted() {
        let doc = json!({"openapi": "3.0.2", "paths": {}});
        assert!(evaluate_openapi_version(Some(&doc)).success);
    }

    #[test]
    fn test_openapi_version_missing() {
        let doc = json!({"swagger": "2.0"});
        let outcome = evaluate_openapi_version(Some(&doc));
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), NO_OAS3_MESSAGE);
    }

    #[test]
    fn test_openapi_version_no_document() {
        let outcome = evaluate_openapi_version(None);
        assert!(!outcome.success);
        assert_eq!(outcome.errors_text(), INVALID_JSON_MESSAGE);
    }

    #[test]
    fn test_trailing_slashes_flagged_in_order() {
        let doc = json!({
            "paths": {
                "/things/": {"get": {}},
                "/things/{id}": {"get": {}},
                "/others/": {"get": {}}
            }
        });
        let outcome = evaluate_trailing_slashes(Some(&doc));
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors_text(),
            "trailing slash found for path /things/\ntrailing slash found for path /others/"
        );
    }

    #[test]
    fn test_trailing_slashes_clean_document() {
        let doc = json!({"paths": {"/things": {"get": {}}}});
        assert!(evaluate_trailing_slashes(Some(&doc)).success);
    }
}

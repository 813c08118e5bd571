//! Scenario-case matching and log shaping for the capture proxy.

use serde_json::{json, Value as JsonValue};

use crate::entity::scenario_case;
use crate::models::CallOutcome;

/// Match a captured call against a case pattern.
///
/// Patterns are compared segment by segment; a `{placeholder}` segment
/// matches any single non-empty segment. Query strings are ignored.
pub fn case_matches(case_method: &str, case_url: &str, method: &str, path: &str) -> bool {
    if !case_method.eq_ignore_ascii_case(method) {
        return false;
    }

    let path = path.split('?').next().unwrap_or(path);
    let pattern_segments: Vec<&str> = case_url.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return false;
    }

    pattern_segments
        .iter()
        .zip(path_segments.iter())
        .all(|(pattern, actual)| {
            (pattern.starts_with('{') && pattern.ends_with('}')) || pattern == actual
        })
}

/// Find the first case of the session type matching the captured call.
pub fn match_case<'a>(
    cases: &'a [scenario_case::Model],
    method: &str,
    path: &str,
) -> Option<&'a scenario_case::Model> {
    cases
        .iter()
        .find(|case| case_matches(&case.http_method, &case.url, method, path))
}

/// Classify an upstream response for the matched case.
pub fn classify_response(status: u16) -> CallOutcome {
    if status < 400 {
        CallOutcome::Success
    } else {
        CallOutcome::Failed
    }
}

/// Shape the captured request envelope stored on a session log.
pub fn request_record(
    method: &str,
    path: &str,
    headers: &[(String, String)],
    body: &str,
) -> JsonValue {
    let header_entries: Vec<JsonValue> = headers
        .iter()
        .map(|(name, value)| {
            let mut entry = serde_json::Map::new();
            entry.insert(name.clone(), JsonValue::String(value.clone()));
            JsonValue::Object(entry)
        })
        .collect();

    json!({
        "request": {
            "method": method,
            "path": path,
            "header": header_entries,
            "body": body,
        }
    })
}

/// Shape the captured response envelope stored on a session log.
pub fn response_record(status: u16, body: &str) -> JsonValue {
    json!({
        "response": {
            "status": status,
            "body": body,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn case(method: &str, url: &str) -> scenario_case::Model {
        scenario_case::Model {
            id: Uuid::now_v7(),
            session_type_id: Uuid::now_v7(),
            http_method: method.to_string(),
            url: url.to_string(),
            sequence: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_match() {
        assert!(case_matches("GET", "zaken", "GET", "/zaken"));
        assert!(!case_matches("GET", "zaken", "POST", "/zaken"));
        assert!(!case_matches("GET", "zaken", "GET", "/other"));
    }

    #[test]
    fn test_method_match_is_case_insensitive() {
        assert!(case_matches("GET", "zaken", "get", "/zaken"));
    }

    #[test]
    fn test_placeholder_segment_matches_any_value() {
        assert!(case_matches("GET", "zaken/{uuid}", "GET", "/zaken/12-34-56"));
        assert!(!case_matches("GET", "zaken/{uuid}", "GET", "/zaken"));
        assert!(!case_matches(
            "GET",
            "zaken/{uuid}",
            "GET",
            "/zaken/12/status"
        ));
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert!(case_matches("GET", "zaken", "GET", "/zaken?page=2"));
    }

    #[test]
    fn test_match_case_returns_first_match() {
        let cases = vec![
            case("GET", "zaken"),
            case("POST", "zaken"),
            case("GET", "zaken/{uuid}"),
        ];

        let matched = match_case(&cases, "GET", "/zaken/42").unwrap();
        assert_eq!(matched.url, "zaken/{uuid}");
        assert!(match_case(&cases, "DELETE", "/zaken").is_none());
    }

    #[test]
    fn test_classify_response() {
        assert!(classify_response(200).is_success());
        assert!(classify_response(308).is_success());
        assert_eq!(classify_response(404), CallOutcome::Failed);
        assert_eq!(classify_response(500), CallOutcome::Failed);
    }

    #[test]
    fn test_request_record_shape() {
        let record = request_record(
            "POST",
            "/zaken",
            &[("content-type".to_string(), "application/json".to_string())],
            "{}",
        );
        assert_eq!(record["request"]["path"], "/zaken");
        assert_eq!(record["request"]["method"], "POST");
        assert_eq!(record["request"]["body"], "{}");
    }
}

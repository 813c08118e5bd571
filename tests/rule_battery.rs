//! Integration tests for the design-rule battery over realistic documents.

use serde_json::json;

use api_conformance_lib::models::{RuleOutcome, RuleType};
use api_conformance_lib::services::design_rules::rules;

/// An introspection document shaped like a small but real OpenAPI 3 file.
fn good_document() -> serde_json::Value {
    json!({
        "openapi": "3.0.0",
        "info": {"title": "Zaken API", "version": "1.0.0"},
        "paths": {
            "/zaken": {
                "get": {"operationId": "zaak_list"},
                "post": {"operationId": "zaak_create"}
            },
            "/zaken/{uuid}": {
                "get": {"operationId": "zaak_read"},
                "put": {"operationId": "zaak_update"},
                "patch": {"operationId": "zaak_partial_update"},
                "delete": {"operationId": "zaak_delete"},
                "head": {"operationId": "zaak_head"},
                "options": {"operationId": "zaak_options"}
            }
        }
    })
}

#[test]
fn full_battery_passes_on_a_conformant_api() {
    let document = good_document();
    let endpoint = "https://api.example.com/api/v1";

    for rule_type in [
        RuleType::Api03,
        RuleType::Api16,
        RuleType::Api20,
        RuleType::Api48,
    ] {
        let outcome = rules::evaluate(rule_type, endpoint, Some(&document));
        assert!(outcome.success, "{} failed: {:?}", rule_type, outcome.errors);
        assert_eq!(outcome.errors_text(), "");
    }
}

#[test]
fn document_rules_share_the_invalid_json_message() {
    let endpoint = "https://api.example.com/api/v1";

    for rule_type in [RuleType::Api03, RuleType::Api16, RuleType::Api48] {
        let outcome = rules::evaluate(rule_type, endpoint, None);
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors_text(),
            "The API did not give a valid JSON output."
        );
    }

    // The URL rule does not look at the document at all.
    let outcome = rules::evaluate(RuleType::Api20, endpoint, None);
    assert!(outcome.success);
}

#[test]
fn method_violations_are_reported_in_document_order() {
    let document = json!({
        "paths": {
            "/auth/login": {"method": {}},
            "/auth/logout": {"getget": {}}
        }
    });

    let outcome = rules::evaluate_methods(Some(&document));
    assert_eq!(
        outcome,
        RuleOutcome {
            success: false,
            errors: vec![
                "not supported method, method, found for path /auth/login".to_string(),
                "not supported method, getget, found for path /auth/logout".to_string(),
            ],
        }
    );
    assert_eq!(
        outcome.errors_text(),
        "not supported method, method, found for path /auth/login\n\
         not supported method, getget, found for path /auth/logout"
    );
}

#[test]
fn version_rule_matches_the_documented_boundary_semantics() {
    let matrix = [
        ("https://api.example.com/v1", true, None),
        ("https://api.example.com/v1/zaken", true, None),
        (
            "https://api.example.com/v1.1",
            false,
            Some("The api endpoint contains more than the major version number in the URI"),
        ),
        (
            "https://api.example.com/v1test",
            false,
            Some("The api endpoint does not contain a 'v*' in the url"),
        ),
        (
            "https://apiv1.example.com/zaken",
            false,
            Some("The api endpoint does not contain a 'v*' in the url"),
        ),
        (
            "https://api.example.com/",
            false,
            Some("The api endpoint does not contain a 'v*' in the url"),
        ),
    ];

    for (endpoint, success, message) in matrix {
        let outcome = rules::evaluate_version_in_uri(endpoint);
        assert_eq!(outcome.success, success, "unexpected outcome for {}", endpoint);
        if let Some(message) = message {
            assert_eq!(outcome.errors_text(), message, "wrong message for {}", endpoint);
        }
    }
}

#[test]
fn an_empty_document_passes_the_path_based_rules_vacuously() {
    let document = json!({"openapi": "3.1.0"});

    assert!(rules::evaluate_methods(Some(&document)).success);
    assert!(rules::evaluate_trailing_slashes(Some(&document)).success);
    assert!(rules::evaluate_openapi_version(Some(&document)).success);
}

//! Integration tests for execution-log post-processing on full log files.

use api_conformance_lib::models::ResultStatus;
use api_conformance_lib::services::postman;

const MIXED_LOG: &str = r#"{
    "run": {
        "executions": [
            {
                "item": {"name": "create zaak"},
                "request": {"method": "POST", "url": "https://provider.example.com/api/v1/zaken"},
                "response": {"code": 201, "status": "Created"},
                "assertions": [
                    {"assertion": "status code is 201"},
                    {"assertion": "json field /url matches"}
                ]
            },
            {
                "item": {"name": "read zaak"},
                "request": {"method": "GET", "url": "https://provider.example.com/api/v1/zaken/1"},
                "response": {"code": 200, "status": "OK"},
                "assertions": [
                    {"assertion": "status code is 200"},
                    {
                        "assertion": "header Content-Type is application/json",
                        "error": {"name": "AssertionError", "message": "header Content-Type is missing"}
                    }
                ]
            },
            {
                "item": {"name": "ping"},
                "request": {"method": "GET", "url": "https://provider.example.com/"},
                "response": {"code": 200, "status": "OK"}
            },
            {
                "item": {"name": "unreachable"},
                "request": {"method": "GET", "url": "https://other.example.com/"},
                "error": "connection refused"
            }
        ]
    }
}"#;

#[test]
fn aggregate_results_flatten_calls_and_assertions() {
    let calls = postman::parse_execution_log(MIXED_LOG).unwrap();
    let aggregate = postman::aggregate_results(&calls);

    assert_eq!(aggregate.assertions.passed, 3);
    assert_eq!(aggregate.assertions.failed, 1);
    assert_eq!(aggregate.assertions.total, 4);

    // "create zaak" and "ping" succeed; "read zaak" fails on its assertion,
    // "unreachable" fails at call level.
    assert_eq!(aggregate.calls.success, 2);
    assert_eq!(aggregate.calls.failed, 2);
    assert_eq!(aggregate.calls.total, 4);
}

#[test]
fn outcome_is_failed_while_any_assertion_fails() {
    let calls = postman::parse_execution_log(MIXED_LOG).unwrap();
    assert_eq!(postman::outcome(&calls), ResultStatus::Failed);
}

#[test]
fn outcome_ignores_call_level_failures_without_assertions() {
    let log = r#"{
        "run": {
            "executions": [
                {
                    "item": {"name": "flaky ping"},
                    "request": {"method": "GET", "url": "https://provider.example.com/"},
                    "response": {"code": 500, "status": "Internal Server Error"}
                }
            ]
        }
    }"#;

    let calls = postman::parse_execution_log(log).unwrap();
    assert_eq!(postman::outcome(&calls), ResultStatus::Success);

    let aggregate = postman::aggregate_results(&calls);
    assert_eq!(aggregate.calls.failed, 1);
    assert_eq!(aggregate.assertions.total, 0);
}

#[test]
fn empty_run_section_yields_zero_totals() {
    let calls = postman::parse_execution_log(r#"{"run": {}}"#).unwrap();
    let aggregate = postman::aggregate_results(&calls);

    assert_eq!(aggregate.assertions.total, 0);
    assert_eq!(aggregate.calls.total, 0);
    assert_eq!(postman::outcome(&calls), ResultStatus::Success);
}

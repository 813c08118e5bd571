//! Execution-log post-processing for provider runs.
//!
//! Logs follow the Newman layout: `{"run": {"executions": [...]}}` where each
//! execution is one HTTP call carrying an optional list of assertion records.
//! Success is never stored flattened; it is recomputed from the log here.

use serde::{Deserialize, Serialize};

use crate::models::{AggregateResults, AssertionTotals, CallTotals, ResultStatus};

/// Root of a JSON execution log.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub run: RunSection,
}

/// The run section of an execution log.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(default)]
    pub executions: Vec<CallRecord>,
}

/// One executed call.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(default)]
    pub item: ItemRecord,
    #[serde(default)]
    pub request: RequestRecord,
    /// Absent when the request never produced a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseRecord>,
    /// Transport error message, when the request failed outright.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Absent when the call declared no assertions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Vec<AssertionRecord>>,
}

/// The collection item a call belongs to.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub name: String,
}

/// The request of one call.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
}

/// The response of one call.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub status: String,
}

/// One evaluated assertion; the `error` key marks it failed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AssertionRecord {
    #[serde(default)]
    pub assertion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AssertionError>,
}

/// Failure detail of one assertion.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AssertionError {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

/// Parse an execution log; the call list is empty for a log without executions.
pub fn parse_execution_log(content: &str) -> Result<Vec<CallRecord>, serde_json::Error> {
    let log: ExecutionLog = serde_json::from_str(content)?;
    Ok(log.run.executions)
}

/// A call's own result: it produced a response below the error range.
pub fn call_result(call: &CallRecord) -> bool {
    call.response.as_ref().is_some_and(|r| r.code < 400)
}

/// Count (positive, negative) assertions over all calls.
///
/// A call without an assertions key contributes nothing to either count.
pub fn call_assertion_counts(calls: &[CallRecord]) -> (u32, u32) {
    let mut positive = 0;
    let mut negative = 0;
    for call in calls {
        if let Some(assertions) = &call.assertions {
            for assertion in assertions {
                if assertion.error.is_some() {
                    negative += 1;
                } else {
                    positive += 1;
                }
            }
        }
    }
    (positive, negative)
}

/// Flatten a log into assertion and call totals.
///
/// A call counts as successful iff its own result is success and none of its
/// assertions failed.
pub fn aggregate_results(calls: &[CallRecord]) -> AggregateResults {
    let mut passed = 0;
    let mut error = 0;
    let mut positive = 0;
    let mut negative = 0;

    for call in calls {
        let mut success = call_result(call);
        if let Some(assertions) = &call.assertions {
            for assertion in assertions {
                if assertion.error.is_some() {
                    error += 1;
                    success = false;
                } else {
                    passed += 1;
                }
            }
        }
        if success {
            positive += 1;
        } else {
            negative += 1;
        }
    }

    AggregateResults {
        assertions: AssertionTotals {
            passed,
            failed: error,
            total: error + passed,
        },
        calls: CallTotals {
            success: positive,
            failed: negative,
            total: negative + positive,
        },
    }
}

/// Overall outcome of one log: success iff no assertion failed.
pub fn outcome(calls: &[CallRecord]) -> ResultStatus {
    let (_, negative) = call_assertion_counts(calls);
    if negative == 0 {
        ResultStatus::Success
    } else {
        ResultStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(code: Option<u16>, assertions: Option<Vec<AssertionRecord>>) -> CallRecord {
        CallRecord {
            item: ItemRecord {
                name: "call".to_string(),
            },
            request: RequestRecord {
                method: "GET".to_string(),
                url: "https://provider.example.com/api/v1/things".to_string(),
            },
            response: code.map(|code| ResponseRecord {
                code,
                status: String::new(),
            }),
            error: None,
            assertions,
        }
    }

    fn passing(name: &str) -> AssertionRecord {
        AssertionRecord {
            assertion: name.to_string(),
            error: None,
        }
    }

    fn failing(name: &str) -> AssertionRecord {
        AssertionRecord {
            assertion: name.to_string(),
            error: Some(AssertionError {
                name: "AssertionError".to_string(),
                message: format!("{} failed", name),
            }),
        }
    }

    #[test]
    fn test_assertion_counts() {
        let calls = vec![
            call(Some(200), Some(vec![passing("a"), failing("b")])),
            call(Some(200), Some(vec![passing("c")])),
        ];
        assert_eq!(call_assertion_counts(&calls), (2, 1));
    }

    #[test]
    fn test_call_without_assertions_key_contributes_no_counts() {
        let calls = vec![call(Some(200), None), call(Some(500), None)];
        let aggregate = aggregate_results(&calls);

        assert_eq!(aggregate.assertions.total, 0);
        // Still classified at call level by the call's own result.
        assert_eq!(aggregate.calls.success, 1);
        assert_eq!(aggregate.calls.failed, 1);
        assert_eq!(aggregate.calls.total, 2);
    }

    #[test]
    fn test_failed_assertion_fails_the_call() {
        let calls = vec![call(Some(200), Some(vec![passing("a"), failing("b")]))];
        let aggregate = aggregate_results(&calls);

        assert_eq!(aggregate.assertions.passed, 1);
        assert_eq!(aggregate.assertions.failed, 1);
        assert_eq!(aggregate.assertions.total, 2);
        assert_eq!(aggregate.calls.success, 0);
        assert_eq!(aggregate.calls.failed, 1);
    }

    #[test]
    fn test_failed_call_result_with_passing_assertions() {
        let calls = vec![call(Some(500), Some(vec![passing("a")]))];
        let aggregate = aggregate_results(&calls);

        assert_eq!(aggregate.assertions.failed, 0);
        assert_eq!(aggregate.calls.failed, 1);
        assert_eq!(aggregate.calls.success, 0);
    }

    #[test]
    fn test_transport_error_call_is_failed() {
        let mut failed_call = call(None, None);
        failed_call.error = Some("connection refused".to_string());
        let aggregate = aggregate_results(&[failed_call]);

        assert_eq!(aggregate.calls.failed, 1);
    }

    #[test]
    fn test_outcome_success_without_failed_assertions() {
        let calls = vec![call(Some(200), Some(vec![passing("a")]))];
        assert_eq!(outcome(&calls), ResultStatus::Success);

        let calls = vec![call(Some(200), Some(vec![failing("a")]))];
        assert_eq!(outcome(&calls), ResultStatus::Failed);
    }

    #[test]
    fn test_parse_execution_log() {
        let content = r#"{
            "run": {
                "executions": [
                    {
                        "item": {"name": "list things"},
                        "request": {"method": "GET", "url": "https://x/v1/things"},
                        "response": {"code": 200, "status": "OK"},
                        "assertions": [
                            {"assertion": "status code is 200"},
                            {"assertion": "body is json", "error": {"name": "AssertionError", "message": "not json"}}
                        ]
                    },
                    {
                        "item": {"name": "bare call"},
                        "request": {"method": "GET", "url": "https://x/v1/other"},
                        "response": {"code": 204, "status": "No Content"}
                    }
                ]
            }
        }"#;

        let calls = parse_execution_log(content).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(call_assertion_counts(&calls), (1, 1));
        assert!(calls[1].assertions.is_none());
    }
}

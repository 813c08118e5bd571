//! Provider-run execution: collection parsing, HTTP calls, assertion
//! evaluation and log-artifact writing.
//!
//! Runs are dispatched fire-and-forget onto a spawned task; callers observe
//! completion by polling the persisted run's status field.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ResultStatus, RunStatus};
use crate::services::artifacts::ArtifactStore;
use crate::services::postman::{
    self, AssertionError, AssertionRecord, CallRecord, ExecutionLog, ItemRecord, RequestRecord,
    ResponseRecord, RunSection,
};

// ============================================================================
// Collection schema
// ============================================================================

/// A stored test collection: named calls with declarative assertions.
#[derive(Debug, Deserialize)]
pub struct Collection {
    pub info: CollectionInfo,
    #[serde(default)]
    pub item: Vec<CollectionItem>,
}

/// Collection metadata.
#[derive(Debug, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
}

/// One scripted call.
#[derive(Debug, Deserialize)]
pub struct CollectionItem {
    pub name: String,
    pub request: CollectionRequest,
    #[serde(default)]
    pub assertions: Vec<CollectionAssertion>,
}

/// The request of a scripted call; `{{variable}}` tokens are substituted
/// before parsing.
#[derive(Debug, Deserialize)]
pub struct CollectionRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub header: Vec<HeaderEntry>,
    #[serde(default)]
    pub body: Option<JsonValue>,
}

/// One request header.
#[derive(Debug, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// Declarative assertions evaluated against the captured response.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectionAssertion {
    StatusCode { expected: u16 },
    HeaderPresent { name: String },
    HeaderEquals { name: String, expected: String },
    JsonFieldEquals { pointer: String, expected: JsonValue },
}

impl CollectionAssertion {
    /// Assertion label written to the execution log.
    pub fn label(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("status code is {}", expected),
            Self::HeaderPresent { name } => format!("header {} is present", name),
            Self::HeaderEquals { name, expected } => format!("header {} is {}", name, expected),
            Self::JsonFieldEquals { pointer, .. } => format!("json field {} matches", pointer),
        }
    }
}

/// Replace `{{name}}` tokens with the bound variable values.
pub fn substitute_variables(content: &str, variables: &HashMap<String, String>) -> String {
    let mut result = content.to_string();
    for (name, value) in variables {
        result = result.replace(&format!("{{{{{}}}}}", name), value);
    }
    result
}

// ============================================================================
// Execution
// ============================================================================

/// A captured response, consumed exactly once.
#[derive(Debug)]
pub struct CapturedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body_json: Option<JsonValue>,
}

impl CapturedResponse {
    pub async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let status_text = resp
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        let body_text = resp.text().await.unwrap_or_default();
        let body_json = serde_json::from_str::<JsonValue>(&body_text).ok();

        Self {
            status,
            status_text,
            headers,
            body_json,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Evaluate one assertion, returning the failure message when it does not hold.
pub fn evaluate_assertion(
    assertion: &CollectionAssertion,
    response: &CapturedResponse,
) -> Option<String> {
    match assertion {
        CollectionAssertion::StatusCode { expected } => {
            if response.status != *expected {
                return Some(format!(
                    "expected status {} but got {}",
                    expected, response.status
                ));
            }
        }
        CollectionAssertion::HeaderPresent { name } => {
            if response.header(name).is_none() {
                return Some(format!("header {} is missing", name));
            }
        }
        CollectionAssertion::HeaderEquals { name, expected } => match response.header(name) {
            None => return Some(format!("header {} is missing", name)),
            Some(actual) if actual != expected => {
                return Some(format!(
                    "expected header {} to be {} but got {}",
                    name, expected, actual
                ));
            }
            Some(_) => {}
        },
        CollectionAssertion::JsonFieldEquals { pointer, expected } => {
            let actual = response
                .body_json
                .as_ref()
                .and_then(|body| body.pointer(pointer));
            match actual {
                None => return Some(format!("json field {} is missing", pointer)),
                Some(actual) if actual != expected => {
                    return Some(format!(
                        "expected json field {} to be {} but got {}",
                        pointer, expected, actual
                    ));
                }
                Some(_) => {}
            }
        }
    }
    None
}

/// Build the assertion records of one call against its captured response.
///
/// A call that never produced a response fails every declared assertion.
pub fn evaluate_assertions(
    assertions: &[CollectionAssertion],
    response: Option<&CapturedResponse>,
) -> Vec<AssertionRecord> {
    assertions
        .iter()
        .map(|assertion| {
            let failure = match response {
                Some(response) => evaluate_assertion(assertion, response),
                None => Some("the request produced no response".to_string()),
            };
            AssertionRecord {
                assertion: assertion.label(),
                error: failure.map(|message| AssertionError {
                    name: "AssertionError".to_string(),
                    message,
                }),
            }
        })
        .collect()
}

/// Execute every call of a parsed collection in order.
pub async fn execute_collection(client: &reqwest::Client, collection: &Collection) -> Vec<CallRecord> {
    let mut calls = Vec::with_capacity(collection.item.len());

    for item in &collection.item {
        let mut request = client.request(
            item.request
                .method
                .parse()
                .unwrap_or(reqwest::Method::GET),
            &item.request.url,
        );
        for header in &item.request.header {
            request = request.header(&header.key, &header.value);
        }
        if let Some(body) = &item.request.body {
            request = request.json(body);
        }

        let (response, transport_error) = match request.send().await {
            Ok(resp) => (Some(CapturedResponse::from_response(resp).await), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let assertions = if item.assertions.is_empty() {
            None
        } else {
            Some(evaluate_assertions(&item.assertions, response.as_ref()))
        };

        calls.push(CallRecord {
            item: ItemRecord {
                name: item.name.clone(),
            },
            request: RequestRecord {
                method: item.request.method.clone(),
                url: item.request.url.clone(),
            },
            response: response.map(|r| ResponseRecord {
                code: r.status,
                status: r.status_text,
            }),
            error: transport_error,
            assertions,
        });
    }

    calls
}

/// Render the minimal HTML log for one executed collection.
pub fn render_html_log(collection_name: &str, calls: &[CallRecord]) -> String {
    let aggregate = postman::aggregate_results(calls);
    let mut rows = String::new();
    for call in calls {
        let code = call
            .response
            .as_ref()
            .map(|r| r.code.to_string())
            .unwrap_or_else(|| "-".to_string());
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{} {}</td><td>{}</td></tr>\n",
            call.item.name, call.request.method, call.request.url, code
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{name}</title></head>\n<body>\n\
         <h1>{name}</h1>\n\
         <p>Total calls: {total_calls}</p>\n\
         <p>Total failed tests: {failed}</p>\n\
         <table>\n{rows}</table>\n\
         </body>\n</html>\n",
        name = collection_name,
        total_calls = aggregate.calls.total,
        failed = aggregate.assertions.failed,
        rows = rows,
    )
}

// ============================================================================
// Dispatch
// ============================================================================

/// Dispatch a run for out-of-band execution and return immediately.
pub fn dispatch_run(pool: DbPool, artifacts: ArtifactStore, run_id: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = execute_run(&pool, &artifacts, run_id).await {
            error!("Provider run {} failed: {}", run_id, e);
            if let Err(e) = pool.update_run_status(run_id, RunStatus::ErrorDeploy).await {
                error!("Failed to mark run {} errored: {}", run_id, e);
            }
        }
    });
}

/// Resolve the variable bindings of a run: run-level endpoint values first,
/// the environment's values for variables the run left unbound.
async fn resolve_variables(pool: &DbPool, run: &crate::entity::server_run::Model) -> AppResult<HashMap<String, String>> {
    let variables = pool.get_scenario_variables(run.test_scenario_id).await?;
    let by_id: HashMap<Uuid, String> = variables
        .into_iter()
        .map(|v| (v.id, v.name))
        .collect();

    let mut bindings = HashMap::new();
    for endpoint in pool.get_environment_endpoints(run.environment_id).await? {
        if let Some(name) = by_id.get(&endpoint.scenario_variable_id) {
            bindings.insert(name.clone(), endpoint.url);
        }
    }
    for endpoint in pool.get_run_endpoints(run.id).await? {
        if let Some(name) = by_id.get(&endpoint.scenario_variable_id) {
            bindings.insert(name.clone(), endpoint.url);
        }
    }

    Ok(bindings)
}

/// Execute a provider run to completion, writing logs and result rows.
pub async fn execute_run(pool: &DbPool, artifacts: &ArtifactStore, run_id: Uuid) -> AppResult<()> {
    let run = pool
        .get_server_run_by_id(run_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Server run".to_string()))?;

    pool.update_run_status(run_id, RunStatus::Running).await?;
    info!("Executing provider run {}", run_id);

    let collections = pool.get_scenario_collections(run.test_scenario_id).await?;
    let variables = resolve_variables(pool, &run).await?;
    let client = reqwest::Client::new();

    let total = collections.len().max(1);
    for (index, collection) in collections.iter().enumerate() {
        let Some(path) = &collection.collection_path else {
            warn!(
                "Collection {} has no stored file, skipping",
                collection.name
            );
            continue;
        };

        let raw = artifacts.read_to_string(path).await?;
        let substituted = substitute_variables(&raw, &variables);
        let parsed: Collection = serde_json::from_str(&substituted).map_err(|e| {
            AppError::InvalidInput(format!(
                "Collection {} is not a valid collection file: {}",
                collection.name, e
            ))
        })?;

        let calls = execute_collection(&client, &parsed).await;
        let status = postman::outcome(&calls);

        let log = ExecutionLog {
            run: RunSection { executions: calls },
        };
        let json_log = serde_json::to_string_pretty(&log)?;
        let json_path = artifacts
            .save_log(run_id, &format!("{}.json", collection.id), &json_log)
            .await?;
        let html_log = render_html_log(&collection.name, &log.run.executions);
        let html_path = artifacts
            .save_log(run_id, &format!("{}.html", collection.id), &html_log)
            .await?;

        pool.insert_postman_test_result(
            collection.id,
            run_id,
            Some(json_path),
            Some(html_path),
            Some(status),
        )
        .await?;

        let percentage = (((index + 1) * 100) / total) as i32;
        pool.update_run_progress(
            run_id,
            percentage,
            format!("Executed {} of {} collections", index + 1, total),
        )
        .await?;
    }

    pool.update_run_status(run_id, RunStatus::Stopped).await?;
    info!("Provider run {} finished", run_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn captured(status: u16, headers: Vec<(&str, &str)>, body: Option<JsonValue>) -> CapturedResponse {
        CapturedResponse {
            status,
            status_text: String::new(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body_json: body,
        }
    }

    #[test]
    fn test_substitute_variables() {
        let mut variables = HashMap::new();
        variables.insert("ZRC".to_string(), "https://ref.example.com/zrc".to_string());

        let content = r#"{"url": "{{ZRC}}/api/v1/zaken", "other": "{{UNBOUND}}"}"#;
        let result = substitute_variables(content, &variables);
        assert_eq!(
            result,
            r#"{"url": "https://ref.example.com/zrc/api/v1/zaken", "other": "{{UNBOUND}}"}"#
        );
    }

    #[test]
    fn test_status_assertion() {
        let response = captured(200, vec![], None);
        assert!(
            evaluate_assertion(&CollectionAssertion::StatusCode { expected: 200 }, &response)
                .is_none()
        );
        assert!(
            evaluate_assertion(&CollectionAssertion::StatusCode { expected: 201 }, &response)
                .is_some()
        );
    }

    #[test]
    fn test_header_assertions() {
        let response = captured(200, vec![("Content-Type", "application/json")], None);

        assert!(evaluate_assertion(
            &CollectionAssertion::HeaderPresent {
                name: "content-type".to_string()
            },
            &response
        )
        .is_none());

        assert!(evaluate_assertion(
            &CollectionAssertion::HeaderEquals {
                name: "Content-Type".to_string(),
                expected: "text/html".to_string()
            },
            &response
        )
        .is_some());
    }

    #[test]
    fn test_json_field_assertion() {
        let response = captured(200, vec![], Some(json!({"count": 3, "results": []})));

        assert!(evaluate_assertion(
            &CollectionAssertion::JsonFieldEquals {
                pointer: "/count".to_string(),
                expected: json!(3)
            },
            &response
        )
        .is_none());

        assert!(evaluate_assertion(
            &CollectionAssertion::JsonFieldEquals {
                pointer: "/missing".to_string(),
                expected: json!(1)
            },
            &response
        )
        .is_some());
    }

    #[test]
    fn test_no_response_fails_every_assertion() {
        let assertions = vec![
            CollectionAssertion::StatusCode { expected: 200 },
            CollectionAssertion::HeaderPresent {
                name: "Content-Type".to_string(),
            },
        ];
        let records = evaluate_assertions(&assertions, None);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.error.is_some()));
    }

    #[test]
    fn test_html_log_reports_failed_total() {
        let calls = vec![CallRecord {
            item: ItemRecord {
                name: "list".to_string(),
            },
            request: RequestRecord {
                method: "GET".to_string(),
                url: "https://x/v1/things".to_string(),
            },
            response: Some(ResponseRecord {
                code: 200,
                status: "OK".to_string(),
            }),
            error: None,
            assertions: Some(vec![AssertionRecord {
                assertion: "status code is 201".to_string(),
                error: Some(AssertionError {
                    name: "AssertionError".to_string(),
                    message: "expected status 201 but got 200".to_string(),
                }),
            }]),
        }];

        let html = render_html_log("smoke", &calls);
        assert!(html.contains("Total failed tests: 1"));
        assert!(html.contains("GET https://x/v1/things"));
    }

    #[test]
    fn test_collection_parsing() {
        let content = r#"{
            "info": {"name": "smoke"},
            "item": [
                {
                    "name": "list things",
                    "request": {
                        "method": "GET",
                        "url": "https://x/v1/things",
                        "header": [{"key": "Accept", "value": "application/json"}]
                    },
                    "assertions": [
                        {"type": "status_code", "expected": 200},
                        {"type": "json_field_equals", "pointer": "/count", "expected": 0}
                    ]
                }
            ]
        }"#;

        let collection: Collection = serde_json::from_str(content).unwrap();
        assert_eq!(collection.info.name, "smoke");
        assert_eq!(collection.item.len(), 1);
        assert_eq!(collection.item[0].assertions.len(), 2);
        assert_eq!(
            collection.item[0].assertions[0].label(),
            "status code is 200"
        );
    }
}

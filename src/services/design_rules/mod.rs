//! Design-rule session orchestration and suite aggregation.

pub mod rules;

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::db::DbPool;
use crate::entity::{rule_result, rule_session, test_suite, test_version};
use crate::error::AppResult;
use crate::models::RuleType;

/// Fetch the suite's endpoint document.
///
/// Transport failures are tolerated: the evaluators treat a missing body the
/// same as invalid JSON, so the session is still created and scored.
pub async fn fetch_endpoint_document(api_endpoint: &str) -> Option<String> {
    match reqwest::get(api_endpoint).await {
        Ok(response) => match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to read body from {}: {}", api_endpoint, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to fetch {}: {}", api_endpoint, e);
            None
        }
    }
}

/// Start one evaluation session for a suite against a rule-set version.
///
/// Creates exactly one session row and one result row per enabled rule.
pub async fn start_session(
    pool: &DbPool,
    suite: &test_suite::Model,
    version: &test_version::Model,
) -> AppResult<(rule_session::Model, Vec<rule_result::Model>)> {
    let body = fetch_endpoint_document(&suite.api_endpoint).await;

    let session = pool
        .insert_rule_session(suite.id, version.id, body)
        .await?;

    info!(
        "Started design-rule session {} for suite {} ({})",
        session.id, suite.id, suite.api_endpoint
    );

    let results = run_rules(pool, &session, &suite.api_endpoint).await?;
    Ok((session, results))
}

/// Evaluate each enabled rule of the session's version exactly once.
///
/// A result that already exists for (session, rule) is returned unchanged;
/// concurrent duplicates are absorbed by the upsert's unique index.
pub async fn run_rules(
    pool: &DbPool,
    session: &rule_session::Model,
    api_endpoint: &str,
) -> AppResult<Vec<rule_result::Model>> {
    let document: Option<JsonValue> = session
        .json_result
        .as_deref()
        .and_then(|body| serde_json::from_str(body).ok());

    let options = pool.get_version_options(session.test_version_id).await?;

    let mut results = Vec::with_capacity(options.len());
    for option in options {
        let Some(rule_type) = RuleType::parse(&option.rule_type) else {
            warn!("Skipping unknown rule type {}", option.rule_type);
            continue;
        };

        if let Some(existing) = pool.get_rule_result(session.id, rule_type).await? {
            results.push(existing);
            continue;
        }

        let outcome = rules::evaluate(rule_type, api_endpoint, document.as_ref());
        let result = pool
            .upsert_rule_result(session.id, rule_type, outcome.success, outcome.errors_text())
            .await?;
        results.push(result);
    }

    Ok(results)
}

/// True iff the session has results and all of them succeeded.
pub fn session_successful(results: &[rule_result::Model]) -> bool {
    !results.is_empty() && results.iter().all(|r| r.success)
}

/// Successful results over total results as a percentage with two decimals;
/// 0.00 for an empty result set.
pub fn percentage_score(results: &[rule_result::Model]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let successful = results.iter().filter(|r| r.success).count();
    let ratio = successful as f64 / results.len() as f64;
    (ratio * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn result(success: bool) -> rule_result::Model {
        rule_result::Model {
            id: Uuid::now_v7(),
            session_id: Uuid::now_v7(),
            rule_type: "api_20".to_string(),
            success,
            errors: if success {
                String::new()
            } else {
                "The api endpoint does not contain a 'v*' in the url".to_string()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_successful_requires_results() {
        assert!(!session_successful(&[]));
    }

    #[test]
    fn test_session_successful_all_success() {
        assert!(session_successful(&[result(true), result(true)]));
    }

    #[test]
    fn test_session_not_successful_with_failure() {
        assert!(!session_successful(&[result(true), result(false)]));
    }

    #[test]
    fn test_percentage_score_no_results() {
        assert_eq!(percentage_score(&[]), 0.0);
    }

    #[test]
    fn test_percentage_score_all_successful() {
        let results = vec![result(true), result(true), result(true)];
        assert_eq!(percentage_score(&results), 100.0);
    }

    #[test]
    fn test_percentage_score_rounds_to_two_decimals() {
        let results = vec![result(true), result(false), result(false)];
        assert_eq!(percentage_score(&results), 33.33);
    }
}

//! Database queries for design-rule suites, sessions and results.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::rule_result::{self, ActiveModel as RuleResultActiveModel, Entity as RuleResult};
use crate::entity::rule_session::{self, ActiveModel as SessionActiveModel, Entity as RuleSession};
use crate::entity::test_option::{self, Entity as TestOption};
use crate::entity::test_suite::{self, ActiveModel as TestSuiteActiveModel, Entity as TestSuite};
use crate::entity::test_version::{self, Entity as TestVersion};
use crate::error::{AppError, AppResult};
use crate::models::RuleType;

use super::DbPool;

impl DbPool {
    /// Insert a new test suite.
    pub async fn insert_test_suite(
        &self,
        name: String,
        api_endpoint: String,
    ) -> AppResult<test_suite::Model> {
        let now = Utc::now();

        let model = TestSuiteActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            api_endpoint: Set(api_endpoint),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert test suite: {}", e)))?;

        Ok(result)
    }

    /// Get a test suite by ID.
    pub async fn get_test_suite_by_id(&self, id: Uuid) -> AppResult<Option<test_suite::Model>> {
        let result = TestSuite::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test suite: {}", e)))?;

        Ok(result)
    }

    /// List test suites, newest first.
    pub async fn list_test_suites(&self) -> AppResult<Vec<test_suite::Model>> {
        let result = TestSuite::find()
            .order_by_desc(test_suite::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test suites: {}", e)))?;

        Ok(result)
    }

    /// Get a rule-set version by ID, or the default (oldest) one.
    pub async fn get_test_version(
        &self,
        id: Option<Uuid>,
    ) -> AppResult<Option<test_version::Model>> {
        let mut select = TestVersion::find();
        select = match id {
            Some(id) => select.filter(test_version::Column::Id.eq(id)),
            None => select.order_by_asc(test_version::Column::CreatedAt),
        };

        let result = select
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test version: {}", e)))?;

        Ok(result)
    }

    /// List rule-set versions with their enabled rules in evaluation order.
    pub async fn list_test_versions(
        &self,
    ) -> AppResult<Vec<(test_version::Model, Vec<test_option::Model>)>> {
        let versions = TestVersion::find()
            .order_by_asc(test_version::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test versions: {}", e)))?;

        let mut result = Vec::with_capacity(versions.len());
        for version in versions {
            let options = self.get_version_options(version.id).await?;
            result.push((version, options));
        }

        Ok(result)
    }

    /// Get the enabled rules of a version in evaluation order.
    pub async fn get_version_options(
        &self,
        version_id: Uuid,
    ) -> AppResult<Vec<test_option::Model>> {
        let result = TestOption::find()
            .filter(test_option::Column::TestVersionId.eq(version_id))
            .order_by_asc(test_option::Column::Sequence)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test options: {}", e)))?;

        Ok(result)
    }

    /// Insert a new evaluation session.
    pub async fn insert_rule_session(
        &self,
        suite_id: Uuid,
        version_id: Uuid,
        json_result: Option<String>,
    ) -> AppResult<rule_session::Model> {
        let now = Utc::now();

        let model = SessionActiveModel {
            id: Set(Uuid::now_v7()),
            test_suite_id: Set(suite_id),
            test_version_id: Set(version_id),
            started_at: Set(now),
            json_result: Set(json_result),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert session: {}", e)))?;

        Ok(result)
    }

    /// Get an evaluation session by ID.
    pub async fn get_rule_session_by_id(&self, id: Uuid) -> AppResult<Option<rule_session::Model>> {
        let result = RuleSession::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session: {}", e)))?;

        Ok(result)
    }

    /// Get a suite's sessions, newest first.
    pub async fn get_suite_sessions(&self, suite_id: Uuid) -> AppResult<Vec<rule_session::Model>> {
        let result = RuleSession::find()
            .filter(rule_session::Column::TestSuiteId.eq(suite_id))
            .order_by_desc(rule_session::Column::StartedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get suite sessions: {}", e)))?;

        Ok(result)
    }

    /// Get a session's results in rule-type order.
    pub async fn get_session_results(
        &self,
        session_id: Uuid,
    ) -> AppResult<Vec<rule_result::Model>> {
        let result = RuleResult::find()
            .filter(rule_result::Column::SessionId.eq(session_id))
            .order_by_asc(rule_result::Column::RuleType)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session results: {}", e)))?;

        Ok(result)
    }

    /// Get the existing result for (session, rule), if any.
    pub async fn get_rule_result(
        &self,
        session_id: Uuid,
        rule_type: RuleType,
    ) -> AppResult<Option<rule_result::Model>> {
        let result = RuleResult::find()
            .filter(rule_result::Column::SessionId.eq(session_id))
            .filter(rule_result::Column::RuleType.eq(rule_type.as_str()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get rule result: {}", e)))?;

        Ok(result)
    }

    /// Idempotently persist one rule's outcome for a session.
    ///
    /// The insert runs ON CONFLICT (session_id, rule_type) DO NOTHING under
    /// the unique index, so concurrent evaluations of the same rule cannot
    /// produce a second row; the surviving row is returned either way.
    pub async fn upsert_rule_result(
        &self,
        session_id: Uuid,
        rule_type: RuleType,
        success: bool,
        errors: String,
    ) -> AppResult<rule_result::Model> {
        let now = Utc::now();

        let model = RuleResultActiveModel {
            id: Set(Uuid::now_v7()),
            session_id: Set(session_id),
            rule_type: Set(rule_type.as_str().to_string()),
            success: Set(success),
            errors: Set(errors),
            created_at: Set(now),
            updated_at: Set(now),
        };

        RuleResult::insert(model)
            .on_conflict(
                OnConflict::columns([
                    rule_result::Column::SessionId,
                    rule_result::Column::RuleType,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to upsert rule result: {}", e)))?;

        self.get_rule_result(session_id, rule_type)
            .await?
            .ok_or_else(|| AppError::Database("Rule result missing after upsert".to_string()))
    }
}

//! Database queries for capture sessions, logs and reports.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::endpoint_config::{
    self, ActiveModel as EndpointConfigActiveModel, Entity as EndpointConfig,
};
use crate::entity::exposed_url::{self, ActiveModel as ExposedUrlActiveModel, Entity as ExposedUrl};
use crate::entity::report::{self, ActiveModel as ReportActiveModel, Entity as Report};
use crate::entity::scenario_case::{
    self, ActiveModel as ScenarioCaseActiveModel, Entity as ScenarioCase,
};
use crate::entity::session::{self, ActiveModel as SessionActiveModel, Entity as Session};
use crate::entity::session_log::{self, ActiveModel as LogActiveModel, Entity as SessionLog};
use crate::entity::session_type::{
    self, ActiveModel as SessionTypeActiveModel, Entity as SessionType,
};
use crate::error::{AppError, AppResult};
use crate::models::{CallOutcome, EndpointConfigSpec, ScenarioCaseSpec, SessionStatus};

use super::DbPool;

impl DbPool {
    /// Insert a session type with its endpoint configs and scenario cases.
    pub async fn insert_session_type(
        &self,
        name: String,
        standard: Option<String>,
        role: Option<String>,
        application: Option<String>,
        version: Option<String>,
        endpoints: Vec<EndpointConfigSpec>,
        cases: Vec<ScenarioCaseSpec>,
    ) -> AppResult<session_type::Model> {
        let now = Utc::now();

        let session_type = SessionTypeActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            standard: Set(standard),
            role: Set(role),
            application: Set(application),
            version: Set(version),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert session type: {}", e)))?;

        for endpoint in endpoints {
            EndpointConfigActiveModel {
                id: Set(Uuid::now_v7()),
                session_type_id: Set(session_type.id),
                name: Set(endpoint.name),
                target_url: Set(endpoint.target_url),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert endpoint config: {}", e)))?;
        }

        for (sequence, case) in cases.into_iter().enumerate() {
            ScenarioCaseActiveModel {
                id: Set(Uuid::now_v7()),
                session_type_id: Set(session_type.id),
                http_method: Set(case.http_method),
                url: Set(case.url),
                sequence: Set(sequence as i32),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert scenario case: {}", e)))?;
        }

        Ok(session_type)
    }

    /// List session types ordered by name.
    pub async fn list_session_types(&self) -> AppResult<Vec<session_type::Model>> {
        let result = SessionType::find()
            .order_by_asc(session_type::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list session types: {}", e)))?;

        Ok(result)
    }

    /// Get a session type by its unique name.
    pub async fn get_session_type_by_name(
        &self,
        name: &str,
    ) -> AppResult<Option<session_type::Model>> {
        let result = SessionType::find()
            .filter(session_type::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session type: {}", e)))?;

        Ok(result)
    }

    /// Get a session type by ID.
    pub async fn get_session_type_by_id(&self, id: Uuid) -> AppResult<Option<session_type::Model>> {
        let result = SessionType::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session type: {}", e)))?;

        Ok(result)
    }

    /// Get a session type's endpoint configurations.
    pub async fn get_endpoint_configs(
        &self,
        session_type_id: Uuid,
    ) -> AppResult<Vec<endpoint_config::Model>> {
        let result = EndpointConfig::find()
            .filter(endpoint_config::Column::SessionTypeId.eq(session_type_id))
            .order_by_asc(endpoint_config::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get endpoint configs: {}", e)))?;

        Ok(result)
    }

    /// Get an endpoint configuration by ID.
    pub async fn get_endpoint_config_by_id(
        &self,
        id: Uuid,
    ) -> AppResult<Option<endpoint_config::Model>> {
        let result = EndpointConfig::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get endpoint config: {}", e)))?;

        Ok(result)
    }

    /// Get a session type's scenario cases in declared order.
    pub async fn get_scenario_cases(
        &self,
        session_type_id: Uuid,
    ) -> AppResult<Vec<scenario_case::Model>> {
        let result = ScenarioCase::find()
            .filter(scenario_case::Column::SessionTypeId.eq(session_type_id))
            .order_by_asc(scenario_case::Column::Sequence)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get scenario cases: {}", e)))?;

        Ok(result)
    }

    /// Insert a new capture session.
    pub async fn insert_session(
        &self,
        session_type_id: Uuid,
        name: String,
        build_version: Option<String>,
    ) -> AppResult<session::Model> {
        let now = Utc::now();

        let result = SessionActiveModel {
            id: Set(Uuid::now_v7()),
            session_type_id: Set(session_type_id),
            name: Set(name),
            status: Set(SessionStatus::Running.as_str().to_string()),
            started_at: Set(now),
            stopped_at: Set(None),
            build_version: Set(build_version),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert session: {}", e)))?;

        Ok(result)
    }

    /// Get a capture session by ID.
    pub async fn get_session_by_id(&self, id: Uuid) -> AppResult<Option<session::Model>> {
        let result = Session::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session: {}", e)))?;

        Ok(result)
    }

    /// List capture sessions, newest first.
    pub async fn list_sessions(&self) -> AppResult<Vec<session::Model>> {
        let result = Session::find()
            .order_by_desc(session::Column::StartedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list sessions: {}", e)))?;

        Ok(result)
    }

    /// Mark a session stopped.
    pub async fn stop_session(&self, session_id: Uuid) -> AppResult<session::Model> {
        let session = self
            .get_session_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

        let mut model: SessionActiveModel = session.into();
        model.status = Set(SessionStatus::Stopped.as_str().to_string());
        model.stopped_at = Set(Some(Utc::now()));
        model.updated_at = Set(Utc::now());

        let result = model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to stop session: {}", e)))?;

        Ok(result)
    }

    /// Expose a proxy subpath for a session endpoint.
    pub async fn insert_exposed_url(
        &self,
        session_id: Uuid,
        endpoint_config_id: Uuid,
        subpath: String,
    ) -> AppResult<exposed_url::Model> {
        let now = Utc::now();

        let result = ExposedUrlActiveModel {
            id: Set(Uuid::now_v7()),
            session_id: Set(session_id),
            endpoint_config_id: Set(endpoint_config_id),
            subpath: Set(subpath),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert exposed url: {}", e)))?;

        Ok(result)
    }

    /// Resolve an exposed subpath token.
    pub async fn get_exposed_url_by_subpath(
        &self,
        subpath: &str,
    ) -> AppResult<Option<exposed_url::Model>> {
        let result = ExposedUrl::find()
            .filter(exposed_url::Column::Subpath.eq(subpath))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get exposed url: {}", e)))?;

        Ok(result)
    }

    /// Get a session's exposed subpaths.
    pub async fn get_session_exposed_urls(
        &self,
        session_id: Uuid,
    ) -> AppResult<Vec<exposed_url::Model>> {
        let result = ExposedUrl::find()
            .filter(exposed_url::Column::SessionId.eq(session_id))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get exposed urls: {}", e)))?;

        Ok(result)
    }

    /// Record a captured call.
    pub async fn insert_session_log(
        &self,
        session_id: Uuid,
        request: Option<JsonValue>,
        response: Option<JsonValue>,
        response_status: Option<i32>,
    ) -> AppResult<session_log::Model> {
        let now = Utc::now();

        let result = LogActiveModel {
            id: Set(Uuid::now_v7()),
            session_id: Set(session_id),
            date: Set(now),
            request: Set(request),
            response: Set(response),
            response_status: Set(response_status),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert session log: {}", e)))?;

        Ok(result)
    }

    /// Get a session's captured calls in order.
    pub async fn get_session_logs(&self, session_id: Uuid) -> AppResult<Vec<session_log::Model>> {
        let result = SessionLog::find()
            .filter(session_log::Column::SessionId.eq(session_id))
            .order_by_asc(session_log::Column::Date)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session logs: {}", e)))?;

        Ok(result)
    }

    /// Record a scenario-case outcome for a captured call.
    pub async fn insert_report(
        &self,
        session_id: Uuid,
        scenario_case_id: Uuid,
        session_log_id: Option<Uuid>,
        result: CallOutcome,
    ) -> AppResult<report::Model> {
        let now = Utc::now();

        let model = ReportActiveModel {
            id: Set(Uuid::now_v7()),
            scenario_case_id: Set(scenario_case_id),
            session_log_id: Set(session_log_id),
            session_id: Set(session_id),
            result: Set(result.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert report: {}", e)))?;

        Ok(model)
    }

    /// Get a session's reports.
    pub async fn get_session_reports(&self, session_id: Uuid) -> AppResult<Vec<report::Model>> {
        let result = Report::find()
            .filter(report::Column::SessionId.eq(session_id))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session reports: {}", e)))?;

        Ok(result)
    }
}

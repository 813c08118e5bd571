//! Database queries for provider runs, their endpoint values and results.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::endpoint::{self, ActiveModel as EndpointActiveModel, Entity as Endpoint};
use crate::entity::postman_test_result::{
    self, ActiveModel as ResultActiveModel, Entity as PostmanTestResult,
};
use crate::entity::server_run::{self, ActiveModel as RunActiveModel, Entity as ServerRun};
use crate::error::{AppError, AppResult};
use crate::models::{ResultStatus, RunStatus};

use super::DbPool;

/// Endpoint value resolved against a scenario variable, ready for insertion.
pub struct NewEndpoint {
    pub scenario_variable_id: Uuid,
    pub url: String,
}

impl DbPool {
    /// Insert a new provider run in `starting` state.
    pub async fn insert_server_run(
        &self,
        scenario_id: Uuid,
        environment_id: Uuid,
        scheduled_scenario_id: Option<Uuid>,
        scheduled: bool,
        build_version: String,
    ) -> AppResult<server_run::Model> {
        let now = Utc::now();

        let result = RunActiveModel {
            id: Set(Uuid::now_v7()),
            test_scenario_id: Set(scenario_id),
            environment_id: Set(environment_id),
            scheduled_scenario_id: Set(scheduled_scenario_id),
            started_at: Set(now),
            stopped_at: Set(None),
            status: Set(RunStatus::Starting.as_str().to_string()),
            percentage_exec: Set(None),
            status_exec: Set(None),
            scheduled: Set(scheduled),
            build_version: Set(build_version),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert server run: {}", e)))?;

        Ok(result)
    }

    /// Bind endpoint values to a run.
    pub async fn insert_run_endpoints(
        &self,
        run_id: Uuid,
        endpoints: Vec<NewEndpoint>,
    ) -> AppResult<Vec<endpoint::Model>> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(endpoints.len());

        for ep in endpoints {
            let model = EndpointActiveModel {
                id: Set(Uuid::now_v7()),
                scenario_variable_id: Set(ep.scenario_variable_id),
                server_run_id: Set(Some(run_id)),
                environment_id: Set(None),
                url: Set(ep.url),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert endpoint: {}", e)))?;
            created.push(model);
        }

        Ok(created)
    }

    /// Bind endpoint values to an environment.
    pub async fn insert_environment_endpoints(
        &self,
        environment_id: Uuid,
        endpoints: Vec<NewEndpoint>,
    ) -> AppResult<Vec<endpoint::Model>> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(endpoints.len());

        for ep in endpoints {
            let model = EndpointActiveModel {
                id: Set(Uuid::now_v7()),
                scenario_variable_id: Set(ep.scenario_variable_id),
                server_run_id: Set(None),
                environment_id: Set(Some(environment_id)),
                url: Set(ep.url),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert endpoint: {}", e)))?;
            created.push(model);
        }

        Ok(created)
    }

    /// Get the endpoint values bound to a run.
    pub async fn get_run_endpoints(&self, run_id: Uuid) -> AppResult<Vec<endpoint::Model>> {
        let result = Endpoint::find()
            .filter(endpoint::Column::ServerRunId.eq(run_id))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get run endpoints: {}", e)))?;

        Ok(result)
    }

    /// Get the endpoint values bound to an environment.
    pub async fn get_environment_endpoints(
        &self,
        environment_id: Uuid,
    ) -> AppResult<Vec<endpoint::Model>> {
        let result = Endpoint::find()
            .filter(endpoint::Column::EnvironmentId.eq(environment_id))
            .all(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to get environment endpoints: {}", e))
            })?;

        Ok(result)
    }

    /// Get a run by ID.
    pub async fn get_server_run_by_id(&self, id: Uuid) -> AppResult<Option<server_run::Model>> {
        let result = ServerRun::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get server run: {}", e)))?;

        Ok(result)
    }

    /// List runs, newest first.
    pub async fn list_server_runs(&self) -> AppResult<Vec<server_run::Model>> {
        let result = ServerRun::find()
            .order_by_desc(server_run::Column::StartedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list server runs: {}", e)))?;

        Ok(result)
    }

    /// Get an environment's runs, newest first.
    pub async fn get_environment_runs(
        &self,
        environment_id: Uuid,
    ) -> AppResult<Vec<server_run::Model>> {
        let result = ServerRun::find()
            .filter(server_run::Column::EnvironmentId.eq(environment_id))
            .order_by_desc(server_run::Column::StartedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get environment runs: {}", e)))?;

        Ok(result)
    }

    /// Latest run started on or after `since` for an environment.
    pub async fn get_environment_run_since(
        &self,
        environment_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Option<server_run::Model>> {
        let result = ServerRun::find()
            .filter(server_run::Column::EnvironmentId.eq(environment_id))
            .filter(server_run::Column::StartedAt.gte(since))
            .order_by_desc(server_run::Column::StartedAt)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get environment run: {}", e)))?;

        Ok(result)
    }

    /// Update a run's status, stamping `stopped_at` on terminal states.
    pub async fn update_run_status(&self, run_id: Uuid, status: RunStatus) -> AppResult<()> {
        let run = self
            .get_server_run_by_id(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server run".to_string()))?;

        let mut model: RunActiveModel = run.into();
        model.status = Set(status.as_str().to_string());
        if matches!(status, RunStatus::Stopped | RunStatus::ErrorDeploy) {
            model.stopped_at = Set(Some(Utc::now()));
        }
        model.updated_at = Set(Utc::now());

        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update run status: {}", e)))?;

        Ok(())
    }

    /// Update a run's execution progress.
    pub async fn update_run_progress(
        &self,
        run_id: Uuid,
        percentage_exec: i32,
        status_exec: String,
    ) -> AppResult<()> {
        let run = self
            .get_server_run_by_id(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server run".to_string()))?;

        let mut model: RunActiveModel = run.into();
        model.percentage_exec = Set(Some(percentage_exec));
        model.status_exec = Set(Some(status_exec));
        model.updated_at = Set(Utc::now());

        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update run progress: {}", e)))?;

        Ok(())
    }

    /// Insert a per-collection result for a run.
    pub async fn insert_postman_test_result(
        &self,
        postman_test_id: Uuid,
        run_id: Uuid,
        log_json_path: Option<String>,
        log_html_path: Option<String>,
        status: Option<ResultStatus>,
    ) -> AppResult<postman_test_result::Model> {
        let now = Utc::now();

        let result = ResultActiveModel {
            id: Set(Uuid::now_v7()),
            postman_test_id: Set(postman_test_id),
            server_run_id: Set(run_id),
            log_json_path: Set(log_json_path),
            log_html_path: Set(log_html_path),
            status: Set(status.map(|s| s.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test result: {}", e)))?;

        Ok(result)
    }

    /// Get a run's per-collection results in creation order.
    pub async fn get_run_results(&self, run_id: Uuid) -> AppResult<Vec<postman_test_result::Model>> {
        let result = PostmanTestResult::find()
            .filter(postman_test_result::Column::ServerRunId.eq(run_id))
            .order_by_asc(postman_test_result::Column::Id) // UUIDv7 is time-ordered
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get run results: {}", e)))?;

        Ok(result)
    }
}

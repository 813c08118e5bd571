//! Database queries for provider scenarios, collections, environments and schedules.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::environment::{self, ActiveModel as EnvironmentActiveModel, Entity as Environment};
use crate::entity::postman_test::{self, ActiveModel as PostmanTestActiveModel, Entity as PostmanTest};
use crate::entity::scenario_variable::{
    self, ActiveModel as VariableActiveModel, Entity as ScenarioVariable,
};
use crate::entity::scheduled_scenario::{
    self, ActiveModel as ScheduleActiveModel, Entity as ScheduledScenario,
};
use crate::entity::test_scenario::{self, ActiveModel as ScenarioActiveModel, Entity as TestScenario};
use crate::error::{AppError, AppResult};
use crate::models::ScenarioVariableSpec;

use super::DbPool;

impl DbPool {
    /// Insert a new test scenario with its declared variables.
    pub async fn insert_test_scenario(
        &self,
        name: String,
        description: String,
        active: bool,
        public_logs: bool,
        variables: Vec<ScenarioVariableSpec>,
    ) -> AppResult<(test_scenario::Model, Vec<scenario_variable::Model>)> {
        let now = Utc::now();

        let scenario = ScenarioActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            description: Set(description),
            active: Set(active),
            public_logs: Set(public_logs),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert scenario: {}", e)))?;

        let mut created = Vec::with_capacity(variables.len());
        for spec in variables {
            let variable = VariableActiveModel {
                id: Set(Uuid::now_v7()),
                test_scenario_id: Set(scenario.id),
                name: Set(spec.name),
                placeholder: Set(spec
                    .placeholder
                    .unwrap_or_else(|| "https://www.example.com".to_string())),
                single_line: Set(spec.single_line.unwrap_or(true)),
                hidden: Set(spec.hidden.unwrap_or(false)),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert variable: {}", e)))?;
            created.push(variable);
        }

        Ok((scenario, created))
    }

    /// Get a scenario by ID.
    pub async fn get_scenario_by_id(&self, id: Uuid) -> AppResult<Option<test_scenario::Model>> {
        let result = TestScenario::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get scenario: {}", e)))?;

        Ok(result)
    }

    /// Get a scenario by its unique name.
    pub async fn get_scenario_by_name(&self, name: &str) -> AppResult<Option<test_scenario::Model>> {
        let result = TestScenario::find()
            .filter(test_scenario::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get scenario: {}", e)))?;

        Ok(result)
    }

    /// List scenarios ordered by name.
    pub async fn list_scenarios(&self) -> AppResult<Vec<test_scenario::Model>> {
        let result = TestScenario::find()
            .order_by_asc(test_scenario::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list scenarios: {}", e)))?;

        Ok(result)
    }

    /// Get a scenario's declared variables.
    pub async fn get_scenario_variables(
        &self,
        scenario_id: Uuid,
    ) -> AppResult<Vec<scenario_variable::Model>> {
        let result = ScenarioVariable::find()
            .filter(scenario_variable::Column::TestScenarioId.eq(scenario_id))
            .order_by_asc(scenario_variable::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get scenario variables: {}", e)))?;

        Ok(result)
    }

    /// Insert a stored collection for a scenario; sequence appends at the end.
    pub async fn insert_postman_test(
        &self,
        scenario_id: Uuid,
        name: String,
        version: String,
        collection_path: Option<String>,
        published_url: Option<String>,
    ) -> AppResult<postman_test::Model> {
        let now = Utc::now();

        let next_sequence = PostmanTest::find()
            .filter(postman_test::Column::TestScenarioId.eq(scenario_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count collections: {}", e)))?
            as i32;

        let result = PostmanTestActiveModel {
            id: Set(Uuid::now_v7()),
            test_scenario_id: Set(scenario_id),
            name: Set(name),
            version: Set(version),
            collection_path: Set(collection_path),
            published_url: Set(published_url),
            sequence: Set(next_sequence),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert collection: {}", e)))?;

        Ok(result)
    }

    /// Get a scenario's collections in execution order.
    pub async fn get_scenario_collections(
        &self,
        scenario_id: Uuid,
    ) -> AppResult<Vec<postman_test::Model>> {
        let result = PostmanTest::find()
            .filter(postman_test::Column::TestScenarioId.eq(scenario_id))
            .order_by_asc(postman_test::Column::Sequence)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get collections: {}", e)))?;

        Ok(result)
    }

    /// Insert an environment for a scenario.
    pub async fn insert_environment(
        &self,
        scenario_id: Uuid,
        name: String,
        supplier_name: String,
        software_product: String,
        product_role: String,
    ) -> AppResult<environment::Model> {
        let now = Utc::now();

        let result = EnvironmentActiveModel {
            id: Set(Uuid::now_v7()),
            test_scenario_id: Set(scenario_id),
            name: Set(name),
            supplier_name: Set(supplier_name),
            software_product: Set(software_product),
            product_role: Set(product_role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert environment: {}", e)))?;

        Ok(result)
    }

    /// Get an environment by (scenario, name).
    pub async fn get_environment_by_name(
        &self,
        scenario_id: Uuid,
        name: &str,
    ) -> AppResult<Option<environment::Model>> {
        let result = Environment::find()
            .filter(environment::Column::TestScenarioId.eq(scenario_id))
            .filter(environment::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get environment: {}", e)))?;

        Ok(result)
    }

    /// Get an environment by ID.
    pub async fn get_environment_by_id(&self, id: Uuid) -> AppResult<Option<environment::Model>> {
        let result = Environment::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get environment: {}", e)))?;

        Ok(result)
    }

    /// List a scenario's environments ordered by name.
    pub async fn get_scenario_environments(
        &self,
        scenario_id: Uuid,
    ) -> AppResult<Vec<environment::Model>> {
        let result = Environment::find()
            .filter(environment::Column::TestScenarioId.eq(scenario_id))
            .order_by_asc(environment::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list environments: {}", e)))?;

        Ok(result)
    }

    /// Insert a schedule for an environment.
    pub async fn insert_schedule(
        &self,
        environment_id: Uuid,
        active: bool,
    ) -> AppResult<scheduled_scenario::Model> {
        let now = Utc::now();

        let result = ScheduleActiveModel {
            id: Set(Uuid::now_v7()),
            environment_id: Set(environment_id),
            active: Set(active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert schedule: {}", e)))?;

        Ok(result)
    }

    /// List all active schedules.
    pub async fn list_active_schedules(&self) -> AppResult<Vec<scheduled_scenario::Model>> {
        let result = ScheduledScenario::find()
            .filter(scheduled_scenario::Column::Active.eq(true))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list schedules: {}", e)))?;

        Ok(result)
    }

    /// List schedules for a scenario's environments.
    pub async fn get_scenario_schedules(
        &self,
        scenario_id: Uuid,
    ) -> AppResult<Vec<(scheduled_scenario::Model, environment::Model)>> {
        let environments = self.get_scenario_environments(scenario_id).await?;
        let mut result = Vec::new();
        for env in environments {
            let schedule = ScheduledScenario::find()
                .filter(scheduled_scenario::Column::EnvironmentId.eq(env.id))
                .one(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to get schedule: {}", e)))?;
            if let Some(schedule) = schedule {
                result.push((schedule, env.clone()));
            }
        }

        Ok(result)
    }
}

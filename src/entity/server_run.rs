//! Provider run entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "server_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_scenario_id: Uuid,
    pub environment_id: Uuid,
    pub scheduled_scenario_id: Option<Uuid>,
    pub started_at: DateTimeUtc,
    pub stopped_at: Option<DateTimeUtc>,
    /// starting -> running -> stopped | error_deploy
    pub status: String,
    /// Share of the scenario's collections executed so far, 0-100.
    pub percentage_exec: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub status_exec: Option<String>,
    /// True when started by the schedule scanner rather than an operator.
    pub scheduled: bool,
    pub build_version: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_scenario::Entity",
        from = "Column::TestScenarioId",
        to = "super::test_scenario::Column::Id",
        on_delete = "Cascade"
    )]
    Scenario,
    #[sea_orm(
        belongs_to = "super::environment::Entity",
        from = "Column::EnvironmentId",
        to = "super::environment::Column::Id",
        on_delete = "Cascade"
    )]
    Environment,
    #[sea_orm(
        belongs_to = "super::scheduled_scenario::Entity",
        from = "Column::ScheduledScenarioId",
        to = "super::scheduled_scenario::Column::Id",
        on_delete = "Cascade"
    )]
    Schedule,
    #[sea_orm(has_many = "super::postman_test_result::Entity")]
    Results,
    #[sea_orm(has_many = "super::endpoint::Entity")]
    Endpoints,
}

impl Related<super::test_scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl Related<super::environment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Environment.def()
    }
}

impl Related<super::postman_test_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl Related<super::endpoint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Endpoints.def()
    }
}

impl Related<super::scheduled_scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

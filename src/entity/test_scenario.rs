//! Provider test scenario entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_scenarios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Whether this scenario can be used for new runs.
    pub active: bool,
    /// When enabled, the JSON and HTML execution logs are publicly served.
    pub public_logs: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::scenario_variable::Entity")]
    Variables,
    #[sea_orm(has_many = "super::postman_test::Entity")]
    Collections,
    #[sea_orm(has_many = "super::environment::Entity")]
    Environments,
    #[sea_orm(has_many = "super::server_run::Entity")]
    Runs,
}

impl Related<super::scenario_variable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variables.def()
    }
}

impl Related<super::postman_test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collections.def()
    }
}

impl Related<super::server_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Runs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

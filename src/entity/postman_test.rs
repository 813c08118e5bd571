//! Stored scripted test collection entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "postman_tests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_scenario_id: Uuid,
    pub name: String,
    pub version: String,
    /// Path of the stored collection file, relative to the artifacts directory.
    pub collection_path: Option<String>,
    pub published_url: Option<String>,
    /// Execution order within the scenario.
    pub sequence: i32,
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
    #[sea_orm(has_many = "super::postman_test_result::Entity")]
    Results,
}

impl Related<super::test_scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl Related<super::postman_test_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

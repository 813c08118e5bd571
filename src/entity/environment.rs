//! Named environment a scenario's runs execute against.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "environments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_scenario_id: Uuid,
    pub name: String,
    pub supplier_name: String,
    pub software_product: String,
    pub product_role: String,
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
    #[sea_orm(has_many = "super::server_run::Entity")]
    Runs,
    #[sea_orm(has_many = "super::endpoint::Entity")]
    Endpoints,
}

impl Related<super::test_scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl Related<super::server_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Runs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Named placeholder a scenario's collections reference as `{{name}}`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scenario_variables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_scenario_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub placeholder: String,
    /// Single-line input when true, multi-line otherwise.
    pub single_line: bool,
    /// Hidden values are not echoed back on detail responses.
    pub hidden: bool,
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
    #[sea_orm(has_many = "super::endpoint::Entity")]
    Endpoints,
}

impl Related<super::test_scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl Related<super::endpoint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Endpoints.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

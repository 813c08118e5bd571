//! Design-rule evaluation session entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rule_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_suite_id: Uuid,
    pub test_version_id: Uuid,
    pub started_at: DateTimeUtc,
    /// Raw body fetched from the suite's endpoint; None when the fetch failed.
    #[sea_orm(column_type = "Text", nullable)]
    pub json_result: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_suite::Entity",
        from = "Column::TestSuiteId",
        to = "super::test_suite::Column::Id",
        on_delete = "Cascade"
    )]
    Suite,
    #[sea_orm(
        belongs_to = "super::test_version::Entity",
        from = "Column::TestVersionId",
        to = "super::test_version::Column::Id",
        on_delete = "Cascade"
    )]
    Version,
    #[sea_orm(has_many = "super::rule_result::Entity")]
    Results,
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suite.def()
    }
}

impl Related<super::rule_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl Related<super::test_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Version.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

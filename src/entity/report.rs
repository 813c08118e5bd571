//! Scenario-case outcome entity for SeaORM.
//!
//! Links one scenario case to one captured log entry; the log reference is
//! absent for `not_called` rows written when the session stops.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub scenario_case_id: Uuid,
    pub session_log_id: Option<Uuid>,
    pub session_id: Uuid,
    /// success | failed | not_called
    pub result: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scenario_case::Entity",
        from = "Column::ScenarioCaseId",
        to = "super::scenario_case::Column::Id",
        on_delete = "Cascade"
    )]
    Case,
    #[sea_orm(
        belongs_to = "super::session_log::Entity",
        from = "Column::SessionLogId",
        to = "super::session_log::Column::Id",
        on_delete = "Cascade"
    )]
    Log,
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::scenario_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl Related<super::session_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Log.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Per-rule outcome entity for SeaORM.
//!
//! At most one row exists per (session_id, rule_type); writes go through an
//! insert-on-conflict upsert under the unique index.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rule_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub rule_type: String,
    pub success: bool,
    #[sea_orm(column_type = "Text")]
    pub errors: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rule_session::Entity",
        from = "Column::SessionId",
        to = "super::rule_session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::rule_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

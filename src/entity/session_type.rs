//! Session type entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "session_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub standard: Option<String>,
    pub role: Option<String>,
    pub application: Option<String>,
    pub version: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::endpoint_config::Entity")]
    EndpointConfigs,
    #[sea_orm(has_many = "super::scenario_case::Entity")]
    Cases,
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::endpoint_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EndpointConfigs.def()
    }
}

impl Related<super::scenario_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

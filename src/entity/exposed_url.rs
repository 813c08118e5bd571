//! Proxy subpath token exposed for one session endpoint.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exposed_urls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub endpoint_config_id: Uuid,
    /// Unique token under /runtime/{subpath}/... the proxy accepts calls on.
    #[sea_orm(unique)]
    pub subpath: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::endpoint_config::Entity",
        from = "Column::EndpointConfigId",
        to = "super::endpoint_config::Column::Id",
        on_delete = "Cascade"
    )]
    EndpointConfig,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::endpoint_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EndpointConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

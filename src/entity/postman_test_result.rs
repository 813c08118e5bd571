//! Per-collection execution result entity for SeaORM.
//!
//! Success is recomputed from the JSON log on read; the stored status is the
//! outcome derived when the run finished.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "postman_test_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub postman_test_id: Uuid,
    pub server_run_id: Uuid,
    /// JSON execution log path, relative to the artifacts directory.
    pub log_json_path: Option<String>,
    /// HTML execution log path, relative to the artifacts directory.
    pub log_html_path: Option<String>,
    /// success | failed; None until the collection executed.
    pub status: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::postman_test::Entity",
        from = "Column::PostmanTestId",
        to = "super::postman_test::Column::Id",
        on_delete = "Cascade"
    )]
    Collection,
    #[sea_orm(
        belongs_to = "super::server_run::Entity",
        from = "Column::ServerRunId",
        to = "super::server_run::Column::Id",
        on_delete = "Cascade"
    )]
    Run,
}

impl Related<super::postman_test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collection.def()
    }
}

impl Related<super::server_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Run.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

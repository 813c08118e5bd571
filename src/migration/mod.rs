//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_design_rules;
mod m20260301_000002_create_scenarios;
mod m20260301_000003_create_server_runs;
mod m20260301_000004_create_sessions;
mod m20260301_000005_seed_rule_versions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_design_rules::Migration),
            Box::new(m20260301_000002_create_scenarios::Migration),
            Box::new(m20260301_000003_create_server_runs::Migration),
            Box::new(m20260301_000004_create_sessions::Migration),
            Box::new(m20260301_000005_seed_rule_versions::Migration),
        ]
    }
}

//! Migration: Seed the default rule-set version with the full rule battery.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO test_versions (id, name, version) VALUES
                    ('018f0000-0000-7000-8000-000000000001', 'API design rules', '1.0');

                INSERT INTO test_options (id, test_version_id, rule_type, sequence) VALUES
                    ('018f0000-0000-7000-8000-000000000101', '018f0000-0000-7000-8000-000000000001', 'api_03', 0),
                    ('018f0000-0000-7000-8000-000000000102', '018f0000-0000-7000-8000-000000000001', 'api_16', 1),
                    ('018f0000-0000-7000-8000-000000000103', '018f0000-0000-7000-8000-000000000001', 'api_20', 2),
                    ('018f0000-0000-7000-8000-000000000104', '018f0000-0000-7000-8000-000000000001', 'api_48', 3);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DELETE FROM test_options WHERE test_version_id = '018f0000-0000-7000-8000-000000000001';
                DELETE FROM test_versions WHERE id = '018f0000-0000-7000-8000-000000000001';
                "#,
            )
            .await?;

        Ok(())
    }
}

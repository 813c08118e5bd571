//! Migration: Create provider scenario configuration tables.

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
                CREATE TABLE test_scenarios (
                    id UUID PRIMARY KEY,
                    name VARCHAR(200) NOT NULL UNIQUE,
                    description TEXT NOT NULL DEFAULT '',
                    active BOOLEAN NOT NULL DEFAULT TRUE,
                    public_logs BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE scenario_variables (
                    id UUID PRIMARY KEY,
                    test_scenario_id UUID NOT NULL REFERENCES test_scenarios(id) ON DELETE CASCADE,
                    name VARCHAR(200) NOT NULL,
                    placeholder TEXT NOT NULL DEFAULT 'https://www.example.com',
                    single_line BOOLEAN NOT NULL DEFAULT TRUE,
                    hidden BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (test_scenario_id, name)
                );

                CREATE TABLE postman_tests (
                    id UUID PRIMARY KEY,
                    test_scenario_id UUID NOT NULL REFERENCES test_scenarios(id) ON DELETE CASCADE,
                    name VARCHAR(150) NOT NULL,
                    version VARCHAR(20) NOT NULL DEFAULT '1.0.0',
                    collection_path VARCHAR(500),
                    published_url VARCHAR(500),
                    sequence INTEGER NOT NULL DEFAULT 0,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (name, version)
                );

                CREATE INDEX idx_postman_tests_scenario ON postman_tests(test_scenario_id, sequence);

                CREATE TABLE environments (
                    id UUID PRIMARY KEY,
                    test_scenario_id UUID NOT NULL REFERENCES test_scenarios(id) ON DELETE CASCADE,
                    name VARCHAR(100) NOT NULL,
                    supplier_name VARCHAR(100) NOT NULL DEFAULT '',
                    software_product VARCHAR(100) NOT NULL DEFAULT '',
                    product_role VARCHAR(100) NOT NULL DEFAULT '',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (test_scenario_id, name)
                );

                CREATE TABLE scheduled_scenarios (
                    id UUID PRIMARY KEY,
                    environment_id UUID NOT NULL UNIQUE REFERENCES environments(id) ON DELETE CASCADE,
                    active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for the schedule scanner (active schedules only)
                CREATE INDEX idx_scheduled_scenarios_active ON scheduled_scenarios(active)
                    WHERE active;

                CREATE TRIGGER update_test_scenarios_updated_at
                    BEFORE UPDATE ON test_scenarios
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_scheduled_scenarios_updated_at
                    BEFORE UPDATE ON scheduled_scenarios
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
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
                DROP TABLE IF EXISTS scheduled_scenarios CASCADE;
                DROP TABLE IF EXISTS environments CASCADE;
                DROP TABLE IF EXISTS postman_tests CASCADE;
                DROP TABLE IF EXISTS scenario_variables CASCADE;
                DROP TABLE IF EXISTS test_scenarios CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}

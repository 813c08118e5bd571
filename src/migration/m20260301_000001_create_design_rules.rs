//! Migration: Create design-rule tables and the shared trigger function.
//!
//! A suite references the endpoint under test; a session is one evaluation of
//! a rule-set version against it; results hold one row per rule per session.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE test_suites (
                    id UUID PRIMARY KEY,
                    name VARCHAR(200) NOT NULL,
                    api_endpoint TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_test_suites_created_at ON test_suites(created_at DESC);

                CREATE TABLE test_versions (
                    id UUID PRIMARY KEY,
                    name VARCHAR(200) NOT NULL,
                    version VARCHAR(20) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (name, version)
                );

                CREATE TABLE test_options (
                    id UUID PRIMARY KEY,
                    test_version_id UUID NOT NULL REFERENCES test_versions(id) ON DELETE CASCADE,
                    rule_type VARCHAR(20) NOT NULL
                        CHECK (rule_type IN ('api_03', 'api_16', 'api_20', 'api_48')),
                    sequence INTEGER NOT NULL DEFAULT 0,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (test_version_id, rule_type)
                );

                CREATE TABLE rule_sessions (
                    id UUID PRIMARY KEY,
                    test_suite_id UUID NOT NULL REFERENCES test_suites(id) ON DELETE CASCADE,
                    test_version_id UUID NOT NULL REFERENCES test_versions(id) ON DELETE CASCADE,
                    started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    json_result TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_rule_sessions_suite ON rule_sessions(test_suite_id, started_at DESC);

                CREATE TABLE rule_results (
                    id UUID PRIMARY KEY,
                    session_id UUID NOT NULL REFERENCES rule_sessions(id) ON DELETE CASCADE,
                    rule_type VARCHAR(20) NOT NULL,
                    success BOOLEAN NOT NULL,
                    errors TEXT NOT NULL DEFAULT '',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- One result per rule per session; the idempotent write relies on this.
                CREATE UNIQUE INDEX idx_rule_results_session_rule
                    ON rule_results(session_id, rule_type);

                CREATE TRIGGER update_test_suites_updated_at
                    BEFORE UPDATE ON test_suites
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_rule_sessions_updated_at
                    BEFORE UPDATE ON rule_sessions
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_rule_results_updated_at
                    BEFORE UPDATE ON rule_results
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
                DROP TABLE IF EXISTS rule_results CASCADE;
                DROP TABLE IF EXISTS rule_sessions CASCADE;
                DROP TABLE IF EXISTS test_options CASCADE;
                DROP TABLE IF EXISTS test_versions CASCADE;
                DROP TABLE IF EXISTS test_suites CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}

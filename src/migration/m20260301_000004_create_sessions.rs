//! Migration: Create capture session tables.

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
                CREATE TABLE session_types (
                    id UUID PRIMARY KEY,
                    name VARCHAR(200) NOT NULL UNIQUE,
                    standard VARCHAR(200),
                    role VARCHAR(200),
                    application VARCHAR(200),
                    version VARCHAR(200),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE endpoint_configs (
                    id UUID PRIMARY KEY,
                    session_type_id UUID NOT NULL REFERENCES session_types(id) ON DELETE CASCADE,
                    name VARCHAR(200) NOT NULL,
                    target_url VARCHAR(500) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (session_type_id, name)
                );

                CREATE TABLE scenario_cases (
                    id UUID PRIMARY KEY,
                    session_type_id UUID NOT NULL REFERENCES session_types(id) ON DELETE CASCADE,
                    http_method VARCHAR(20) NOT NULL
                        CHECK (http_method IN ('GET', 'POST', 'PUT', 'PATCH', 'DELETE', 'HEAD', 'OPTIONS')),
                    url VARCHAR(200) NOT NULL,
                    sequence INTEGER NOT NULL DEFAULT 0,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE sessions (
                    id UUID PRIMARY KEY,
                    session_type_id UUID NOT NULL REFERENCES session_types(id) ON DELETE CASCADE,
                    name VARCHAR(30) NOT NULL UNIQUE,
                    status VARCHAR(20) NOT NULL DEFAULT 'starting'
                        CHECK (status IN ('starting', 'running', 'stopped')),
                    started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    stopped_at TIMESTAMPTZ,
                    build_version TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE exposed_urls (
                    id UUID PRIMARY KEY,
                    session_id UUID NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                    endpoint_config_id UUID NOT NULL REFERENCES endpoint_configs(id) ON DELETE CASCADE,
                    subpath VARCHAR(200) NOT NULL UNIQUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE session_logs (
                    id UUID PRIMARY KEY,
                    session_id UUID NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                    date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    request JSONB,
                    response JSONB,
                    response_status INTEGER,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_session_logs_session ON session_logs(session_id, date);

                CREATE TABLE reports (
                    id UUID PRIMARY KEY,
                    scenario_case_id UUID NOT NULL REFERENCES scenario_cases(id) ON DELETE CASCADE,
                    session_log_id UUID REFERENCES session_logs(id) ON DELETE CASCADE,
                    session_id UUID NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                    result VARCHAR(20) NOT NULL DEFAULT 'not_called'
                        CHECK (result IN ('success', 'failed', 'not_called')),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- One report per case per captured log entry
                CREATE UNIQUE INDEX idx_reports_case_log ON reports(scenario_case_id, session_log_id)
                    WHERE session_log_id IS NOT NULL;

                CREATE INDEX idx_reports_session ON reports(session_id);

                CREATE TRIGGER update_sessions_updated_at
                    BEFORE UPDATE ON sessions
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_reports_updated_at
                    BEFORE UPDATE ON reports
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
                DROP TABLE IF EXISTS reports CASCADE;
                DROP TABLE IF EXISTS session_logs CASCADE;
                DROP TABLE IF EXISTS exposed_urls CASCADE;
                DROP TABLE IF EXISTS sessions CASCADE;
                DROP TABLE IF EXISTS scenario_cases CASCADE;
                DROP TABLE IF EXISTS endpoint_configs CASCADE;
                DROP TABLE IF EXISTS session_types CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}

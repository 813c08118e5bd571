//! Migration: Create provider run tables.

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
                CREATE TABLE server_runs (
                    id UUID PRIMARY KEY,
                    test_scenario_id UUID NOT NULL REFERENCES test_scenarios(id) ON DELETE CASCADE,
                    environment_id UUID NOT NULL REFERENCES environments(id) ON DELETE CASCADE,
                    scheduled_scenario_id UUID REFERENCES scheduled_scenarios(id) ON DELETE CASCADE,
                    started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    stopped_at TIMESTAMPTZ,
                    status VARCHAR(20) NOT NULL DEFAULT 'starting'
                        CHECK (status IN ('starting', 'running', 'stopped', 'error_deploy')),
                    percentage_exec INTEGER
                        CHECK (percentage_exec IS NULL OR (percentage_exec >= 0 AND percentage_exec <= 100)),
                    status_exec TEXT,
                    scheduled BOOLEAN NOT NULL DEFAULT FALSE,
                    build_version VARCHAR(100) NOT NULL DEFAULT '',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_server_runs_environment ON server_runs(environment_id, started_at DESC);
                CREATE INDEX idx_server_runs_status ON server_runs(status);

                CREATE TABLE endpoints (
                    id UUID PRIMARY KEY,
                    scenario_variable_id UUID NOT NULL REFERENCES scenario_variables(id) ON DELETE CASCADE,
                    server_run_id UUID REFERENCES server_runs(id) ON DELETE CASCADE,
                    environment_id UUID REFERENCES environments(id) ON DELETE CASCADE,
                    url TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_endpoints_run ON endpoints(server_run_id);

                CREATE TABLE postman_test_results (
                    id UUID PRIMARY KEY,
                    postman_test_id UUID NOT NULL REFERENCES postman_tests(id) ON DELETE CASCADE,
                    server_run_id UUID NOT NULL REFERENCES server_runs(id) ON DELETE CASCADE,
                    log_json_path VARCHAR(500),
                    log_html_path VARCHAR(500),
                    status VARCHAR(10)
                        CHECK (status IS NULL OR status IN ('success', 'failed')),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_postman_test_results_run ON postman_test_results(server_run_id);

                CREATE TRIGGER update_server_runs_updated_at
                    BEFORE UPDATE ON server_runs
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_postman_test_results_updated_at
                    BEFORE UPDATE ON postman_test_results
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
                DROP TABLE IF EXISTS postman_test_results CASCADE;
                DROP TABLE IF EXISTS endpoints CASCADE;
                DROP TABLE IF EXISTS server_runs CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}

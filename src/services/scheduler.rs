//! Schedule scanner for recurring provider runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;
use tracing::{error, info};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::artifacts::ArtifactStore;
use crate::services::runner;

/// Configuration for the schedule scanner.
#[derive(Clone)]
pub struct SchedulerConfig {
    /// How often to scan for due schedules (in seconds)
    pub interval_secs: u64,
}

/// Start the schedule scanner background task.
///
/// This spawns a tokio task that periodically starts a provider run for each
/// active schedule whose environment has not run yet today.
pub fn start_schedule_scanner(pool: Arc<DbPool>, artifacts: ArtifactStore, config: SchedulerConfig) {
    tokio::spawn(async move {
        info!(
            "Starting schedule scanner (interval: {} seconds)",
            config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs));

        loop {
            ticker.tick().await;

            match run_cycle(&pool, &artifacts, Utc::now()).await {
                Ok(0) => {}
                Ok(started) => info!("Schedule scanner started {} run(s)", started),
                Err(e) => error!("Schedule scanner error: {}", e),
            }
        }
    });
}

/// The UTC midnight preceding `now`: a schedule is due when its environment
/// has no run starting at or after this instant.
pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

/// Run a single scan cycle; returns the number of runs started.
pub async fn run_cycle(
    pool: &DbPool,
    artifacts: &ArtifactStore,
    now: DateTime<Utc>,
) -> AppResult<u32> {
    let schedules = pool.list_active_schedules().await?;
    let since = day_start(now);

    let mut started = 0;
    for schedule in schedules {
        if pool
            .get_environment_run_since(schedule.environment_id, since)
            .await?
            .is_some()
        {
            continue;
        }

        let environment = pool
            .get_environment_by_id(schedule.environment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Environment".to_string()))?;

        let run = pool
            .insert_server_run(
                environment.test_scenario_id,
                environment.id,
                Some(schedule.id),
                true,
                String::new(),
            )
            .await?;

        info!(
            "Scheduled run {} started for environment {}",
            run.id, environment.name
        );
        runner::dispatch_run(pool.clone(), artifacts.clone(), run.id);
        started += 1;
    }

    Ok(started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_start_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let start = day_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_start_is_idempotent_at_midnight() {
        let midnight = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(day_start(midnight), midnight);
    }
}

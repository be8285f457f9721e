//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring engagement jobs. Failures are logged and the job waits for its
//! next tick; nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: &crowdcast_core::AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_trending_job(&scheduler, pool.clone(), &config.trending_cron).await?;
    register_streak_reset_job(&scheduler, pool, &config.streak_reset_cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the trending recompute (every five minutes by default).
async fn register_trending_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            tracing::info!("scheduler: starting trending run");
            match crowdcast_jobs::run_trending(&pool, Utc::now()).await {
                Ok(outcome) => tracing::info!(
                    updated = outcome.updated,
                    closed = outcome.closed,
                    "scheduler: trending run complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: trending run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the daily sweep that zeroes streaks with no vote since before
/// yesterday (00:05 UTC by default).
async fn register_streak_reset_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            tracing::info!("scheduler: starting streak reset");
            let today = Utc::now().date_naive();
            match crowdcast_jobs::reset_broken_streaks(&pool, today).await {
                Ok(reset) => tracing::info!(reset, "scheduler: streak reset complete"),
                Err(e) => tracing::error!(error = %e, "scheduler: streak reset failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

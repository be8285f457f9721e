//! `crowdcast jobs` command handlers.
//!
//! Each command runs one job against the configured database and prints the
//! same JSON body the matching HTTP function returns.

use chrono::Utc;
use clap::Subcommand;
use crowdcast_core::AchievementEvent;
use crowdcast_jobs::StreakReport;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Sub-commands available under `jobs`.
#[derive(Debug, Subcommand)]
pub enum JobsCommands {
    /// Recompute trending scores and close expired polls
    Trending,
    /// Update one user's streak, or reset every broken streak
    Streaks {
        /// User who just voted; omit to run the broken-streak sweep
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Grant any achievements the user now qualifies for
    Achievements {
        #[arg(long)]
        user: Uuid,
        /// Limit the check to one family (`poll_created`, `vote`, ...)
        #[arg(long)]
        event: Option<String>,
    },
}

pub(crate) async fn run(pool: &PgPool, command: JobsCommands) -> anyhow::Result<()> {
    match command {
        JobsCommands::Trending => {
            let outcome = crowdcast_jobs::run_trending(pool, Utc::now()).await?;
            print_json(&outcome)
        }
        JobsCommands::Streaks { user } => {
            let today = Utc::now().date_naive();
            let report = match user {
                Some(user_id) => {
                    crowdcast_jobs::update_user_streak(pool, user_id, today).await?;
                    StreakReport::Updated { updated: user_id }
                }
                None => StreakReport::Reset {
                    reset: crowdcast_jobs::reset_broken_streaks(pool, today).await?,
                },
            };
            print_json(&report)
        }
        JobsCommands::Achievements { user, event } => {
            let event = AchievementEvent::from_hint(event.as_deref());
            let outcome = crowdcast_jobs::grant_achievements(pool, user, event).await?;
            print_json(&outcome)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

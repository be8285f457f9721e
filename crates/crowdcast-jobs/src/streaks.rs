//! Voting streak maintenance.

use chrono::NaiveDate;
use crowdcast_core::streaks::yesterday;
use crowdcast_core::{advance_streak, StreakTransition};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::JobError;

/// Response body of a streak run: either the single user that was updated
/// or the number of streaks the sweep reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreakReport {
    Updated { updated: Uuid },
    Reset { reset: u64 },
}

/// Record that `user_id` voted on `today`.
///
/// Repeating the call on the same day changes nothing. The write is
/// conditional on the row that was read, so if a concurrent call for the same
/// user lands first this one reports [`StreakTransition::Unchanged`] instead
/// of double counting.
///
/// # Errors
///
/// Returns [`JobError::Db`] if reading or writing the streak fails.
pub async fn update_user_streak(
    pool: &PgPool,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<StreakTransition, JobError> {
    let existing = crowdcast_db::get_streak(pool, user_id).await?;
    let previous = existing.as_ref().map(crowdcast_db::StreakRow::state);
    let transition = advance_streak(previous.as_ref(), today);

    let written = match (&transition, previous) {
        (StreakTransition::Unchanged, _) => return Ok(transition),
        (StreakTransition::Started(next), _) => {
            crowdcast_db::insert_streak_if_absent(pool, user_id, next).await?
        }
        (StreakTransition::Continued(next) | StreakTransition::Restarted(next), Some(prev)) => {
            crowdcast_db::update_streak_if_unchanged(pool, user_id, prev.last_vote_date, next)
                .await?
        }
        // advance_streak only continues or restarts an existing record.
        (StreakTransition::Continued(_) | StreakTransition::Restarted(_), None) => false,
    };

    if !written {
        tracing::info!(%user_id, "streaks: concurrent update already recorded today's vote");
        return Ok(StreakTransition::Unchanged);
    }

    tracing::debug!(%user_id, ?transition, "streaks: user streak updated");
    Ok(transition)
}

/// Zero every running streak whose last vote is older than yesterday.
///
/// Intended to run once a day; `longest_streak` is never touched.
///
/// # Errors
///
/// Returns [`JobError::Db`] if the sweep update fails.
pub async fn reset_broken_streaks(pool: &PgPool, today: NaiveDate) -> Result<u64, JobError> {
    let Some(cutoff) = yesterday(today) else {
        return Ok(0);
    };

    let reset = crowdcast_db::reset_broken_streaks(pool, cutoff).await?;
    tracing::info!(reset, %cutoff, "streaks: broken streaks reset");
    Ok(reset)
}

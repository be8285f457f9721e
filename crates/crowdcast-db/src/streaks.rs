//! Database operations for `streaks`.

use chrono::NaiveDate;
use crowdcast_core::StreakState;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `streaks` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StreakRow {
    pub user_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_vote_date: NaiveDate,
}

impl StreakRow {
    #[must_use]
    pub fn state(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_vote_date: self.last_vote_date,
        }
    }
}

/// Fetches a user's streak, if one has been recorded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_streak(pool: &PgPool, user_id: Uuid) -> Result<Option<StreakRow>, DbError> {
    let row = sqlx::query_as::<_, StreakRow>(
        "SELECT user_id, current_streak, longest_streak, last_vote_date \
         FROM streaks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a first streak record. Returns `false` if one already exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_streak_if_absent(
    pool: &PgPool,
    user_id: Uuid,
    state: &StreakState,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO streaks (user_id, current_streak, longest_streak, last_vote_date) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(state.current_streak)
    .bind(state.longest_streak)
    .bind(state.last_vote_date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Writes `next` only if the stored `last_vote_date` still equals
/// `expected_last_vote_date`.
///
/// Returns `false` when another writer advanced the record first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_streak_if_unchanged(
    pool: &PgPool,
    user_id: Uuid,
    expected_last_vote_date: NaiveDate,
    next: &StreakState,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE streaks \
         SET current_streak = $1, longest_streak = GREATEST(longest_streak, $2), last_vote_date = $3 \
         WHERE user_id = $4 AND last_vote_date = $5",
    )
    .bind(next.current_streak)
    .bind(next.longest_streak)
    .bind(next.last_vote_date)
    .bind(user_id)
    .bind(expected_last_vote_date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Zeroes `current_streak` for every running streak whose last vote is
/// before `before`. `longest_streak` is left alone. Returns the number reset.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn reset_broken_streaks(pool: &PgPool, before: NaiveDate) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE streaks SET current_streak = 0 \
         WHERE current_streak > 0 AND last_vote_date < $1",
    )
    .bind(before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

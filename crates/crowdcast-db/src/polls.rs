//! Database operations for `polls` and the activity tables that feed the
//! trending score.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use crowdcast_core::{ActivityCounts, PollStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// An `active` poll as needed by the trending recompute.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivePollRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total_votes: i32,
}

/// Poll fields rendered on the share card, joined with the creator's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollShareRow {
    pub id: Uuid,
    pub question: String,
    pub category: Option<String>,
    pub total_votes: i32,
    pub creator_username: Option<String>,
}

/// Returns every poll whose status is `active`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_polls(pool: &PgPool) -> Result<Vec<ActivePollRow>, DbError> {
    let rows = sqlx::query_as::<_, ActivePollRow>(
        "SELECT id, created_at, total_votes \
         FROM polls \
         WHERE status = $1 \
         ORDER BY created_at, id",
    )
    .bind(PollStatus::Active.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[derive(Debug, Clone, Copy)]
enum ActivityTable {
    Votes,
    Comments,
    Reactions,
}

impl ActivityTable {
    fn name(self) -> &'static str {
        match self {
            ActivityTable::Votes => "votes",
            ActivityTable::Comments => "poll_comments",
            ActivityTable::Reactions => "poll_reactions",
        }
    }
}

async fn count_since(
    pool: &PgPool,
    table: ActivityTable,
    poll_ids: &[Uuid],
    since: DateTime<Utc>,
) -> Result<Vec<(Uuid, i64)>, DbError> {
    let sql = format!(
        "SELECT poll_id, COUNT(*) AS n \
         FROM {} \
         WHERE poll_id = ANY($1) AND created_at >= $2 \
         GROUP BY poll_id",
        table.name()
    );

    let rows = sqlx::query_as::<_, (Uuid, i64)>(&sql)
        .bind(poll_ids)
        .bind(since)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Counts votes, comments and reactions per poll with `created_at >= since`.
///
/// Issues one grouped aggregate per activity table. Polls with no recent
/// activity are absent from the returned map.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any of the aggregates fail.
pub async fn load_recent_activity(
    pool: &PgPool,
    poll_ids: &[Uuid],
    since: DateTime<Utc>,
) -> Result<HashMap<Uuid, ActivityCounts>, DbError> {
    let mut counts: HashMap<Uuid, ActivityCounts> = HashMap::new();
    if poll_ids.is_empty() {
        return Ok(counts);
    }

    for table in [
        ActivityTable::Votes,
        ActivityTable::Comments,
        ActivityTable::Reactions,
    ] {
        for (poll_id, n) in count_since(pool, table, poll_ids, since).await? {
            let entry = counts.entry(poll_id).or_default();
            match table {
                ActivityTable::Votes => entry.votes = n,
                ActivityTable::Comments => entry.comments = n,
                ActivityTable::Reactions => entry.reactions = n,
            }
        }
    }

    Ok(counts)
}

/// Sets `trending_score` on one poll. Returns `false` if the poll no longer exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_trending_score(pool: &PgPool, poll_id: Uuid, score: f64) -> Result<bool, DbError> {
    let result = sqlx::query("UPDATE polls SET trending_score = $1 WHERE id = $2")
        .bind(score)
        .bind(poll_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Moves every `active` poll whose `closes_at` is at or before `now` to
/// `closed`. Returns the number of polls closed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn close_expired_polls(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE polls SET status = $2 \
         WHERE status = $3 AND closes_at IS NOT NULL AND closes_at <= $1",
    )
    .bind(now)
    .bind(PollStatus::Closed.as_str())
    .bind(PollStatus::Active.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Fetches the share-card fields for a poll.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no poll has the given id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_poll_share_card(pool: &PgPool, poll_id: Uuid) -> Result<PollShareRow, DbError> {
    sqlx::query_as::<_, PollShareRow>(
        "SELECT p.id, p.question, p.category, p.total_votes, pr.username AS creator_username \
         FROM polls p \
         LEFT JOIN profiles pr ON pr.id = p.creator_id \
         WHERE p.id = $1",
    )
    .bind(poll_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

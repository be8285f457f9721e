//! Trending score recompute.

use chrono::{DateTime, Duration, Utc};
use crowdcast_core::{trending_score, RECENT_ACTIVITY_WINDOW_MINUTES};
use serde::{Serialize, Serializer};
use sqlx::PgPool;
use uuid::Uuid;

use crate::JobError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrendingOutcome {
    /// Active polls whose score was written.
    pub updated: u64,
    /// Expired polls moved to `closed`.
    #[serde(serialize_with = "closed_message")]
    pub closed: u64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn closed_message<S: Serializer>(closed: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{closed} expired polls closed"))
}

/// Recompute `trending_score` for every active poll as of `now`, then close
/// active polls whose deadline has passed.
///
/// A failed write for one poll is logged and skipped; the rest still run.
///
/// # Errors
///
/// Returns [`JobError::Db`] if the active polls or their activity counts
/// cannot be loaded, or if closing expired polls fails.
pub async fn run_trending(pool: &PgPool, now: DateTime<Utc>) -> Result<TrendingOutcome, JobError> {
    let polls = crowdcast_db::list_active_polls(pool).await?;
    let poll_ids: Vec<Uuid> = polls.iter().map(|p| p.id).collect();

    let since = now - Duration::minutes(RECENT_ACTIVITY_WINDOW_MINUTES);
    let activity = crowdcast_db::load_recent_activity(pool, &poll_ids, since).await?;

    let mut updated = 0u64;
    for poll in &polls {
        let recent = activity.get(&poll.id).copied().unwrap_or_default();
        let score = trending_score(recent, i64::from(poll.total_votes), now - poll.created_at);

        match crowdcast_db::update_trending_score(pool, poll.id, score).await {
            Ok(true) => updated += 1,
            Ok(false) => {
                tracing::debug!(poll_id = %poll.id, "trending: poll deleted before update");
            }
            Err(e) => {
                tracing::warn!(poll_id = %poll.id, error = %e, "trending: score update failed");
            }
        }
    }

    let closed = crowdcast_db::close_expired_polls(pool, now).await?;

    tracing::info!(
        active = polls.len(),
        updated,
        closed,
        "trending: scores recomputed"
    );

    Ok(TrendingOutcome { updated, closed })
}

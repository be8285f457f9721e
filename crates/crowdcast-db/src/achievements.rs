//! Database operations for `achievements`, `user_achievements`, and the
//! per-user aggregates achievement rules are checked against.

use crowdcast_core::achievements::{AchievementMetric, VIRAL_POLL_VOTES};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `achievements` catalog.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AchievementRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub xp_reward: i32,
}

/// Returns the full achievement catalog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_achievements(pool: &PgPool) -> Result<Vec<AchievementRow>, DbError> {
    let rows = sqlx::query_as::<_, AchievementRow>(
        "SELECT id, slug, name, description, icon, xp_reward \
         FROM achievements ORDER BY slug",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the ids of every achievement the user has already earned.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_earned_achievement_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, DbError> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT achievement_id FROM user_achievements WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Reads the current value of one per-user aggregate.
///
/// A user with no streak record has a current streak of zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_achievement_metric(
    pool: &PgPool,
    user_id: Uuid,
    metric: AchievementMetric,
) -> Result<i64, DbError> {
    let sql = match metric {
        AchievementMetric::PollsCreated => "SELECT COUNT(*) FROM polls WHERE creator_id = $1",
        AchievementMetric::VotesCast => "SELECT COUNT(*) FROM votes WHERE user_id = $1",
        AchievementMetric::CommunitiesCreated => {
            "SELECT COUNT(*) FROM communities WHERE creator_id = $1"
        }
        AchievementMetric::Followers => "SELECT COUNT(*) FROM follows WHERE following_id = $1",
        AchievementMetric::Comments => "SELECT COUNT(*) FROM poll_comments WHERE user_id = $1",
        AchievementMetric::CurrentStreak => {
            "SELECT COALESCE((SELECT current_streak::BIGINT FROM streaks WHERE user_id = $1), 0)"
        }
        AchievementMetric::ViralPolls => {
            let value = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM polls WHERE creator_id = $1 AND total_votes >= $2",
            )
            .bind(user_id)
            .bind(VIRAL_POLL_VOTES)
            .fetch_one(pool)
            .await?;
            return Ok(value);
        }
    };

    let value = sqlx::query_scalar::<_, i64>(sql)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(value)
}

/// Grants an achievement, awards its XP, and notifies the user, all in one
/// transaction.
///
/// Returns `false` without side effects if the user already holds the
/// achievement, including when a concurrent grant won the race.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction is
/// rolled back.
pub async fn grant_achievement(
    pool: &PgPool,
    user_id: Uuid,
    achievement: &AchievementRow,
) -> Result<bool, DbError> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO user_achievements (user_id, achievement_id) \
         VALUES ($1, $2) \
         ON CONFLICT (user_id, achievement_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(achievement.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("SELECT increment_xp($1, $2)")
        .bind(user_id)
        .bind(achievement.xp_reward)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO notifications (user_id, type, title, body, data) \
         VALUES ($1, 'achievement', $2, $3, $4)",
    )
    .bind(user_id)
    .bind(format!("Achievement unlocked: {}", achievement.name))
    .bind(&achievement.description)
    .bind(json!({
        "achievement_id": achievement.id,
        "icon": achievement.icon,
    }))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

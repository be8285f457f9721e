use crowdcast_core::AchievementConfig;
use sqlx::PgPool;

use crate::DbError;

/// Upsert the achievement catalog by slug.
///
/// Returns the number of entries processed. All upserts run inside a single
/// transaction; if any fails the whole batch is rolled back. Existing grants
/// keep pointing at the same row because the id is preserved on conflict.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_achievements(
    pool: &PgPool,
    achievements: &[AchievementConfig],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for entry in achievements {
        sqlx::query(
            "INSERT INTO achievements (slug, name, description, icon, xp_reward) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 description = EXCLUDED.description, \
                 icon = EXCLUDED.icon, \
                 xp_reward = EXCLUDED.xp_reward",
        )
        .bind(&entry.slug)
        .bind(&entry.name)
        .bind(&entry.description)
        .bind(&entry.icon)
        .bind(entry.xp_reward)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

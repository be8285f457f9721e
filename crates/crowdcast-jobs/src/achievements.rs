//! Achievement grants.

use std::collections::{HashMap, HashSet};

use crowdcast_core::achievements::AchievementMetric;
use crowdcast_core::{rules_for, AchievementEvent};
use crowdcast_db::AchievementRow;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::JobError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AchievementOutcome {
    /// Slugs granted by this run, in rule order.
    pub granted: Vec<String>,
}

/// Check the user's achievement thresholds and grant any newly met ones.
///
/// With no `event` every rule is evaluated; with an event only that family is.
/// Rules whose slug is missing from the catalog, or that the user already
/// holds, are skipped without querying their metric. Each metric is read at
/// most once per run.
///
/// # Errors
///
/// Returns [`JobError::Db`] on the first failing query. Grants committed
/// before the failure stay in place; a rerun will not repeat them.
pub async fn grant_achievements(
    pool: &PgPool,
    user_id: Uuid,
    event: Option<AchievementEvent>,
) -> Result<AchievementOutcome, JobError> {
    let (catalog, earned) = futures::try_join!(
        crowdcast_db::list_achievements(pool),
        crowdcast_db::list_earned_achievement_ids(pool, user_id),
    )?;

    let by_slug: HashMap<&str, &AchievementRow> =
        catalog.iter().map(|a| (a.slug.as_str(), a)).collect();
    let earned: HashSet<Uuid> = earned.into_iter().collect();
    let mut metrics: HashMap<AchievementMetric, i64> = HashMap::new();
    let mut outcome = AchievementOutcome::default();

    for rule in rules_for(event) {
        let Some(achievement) = by_slug.get(rule.slug).copied() else {
            tracing::debug!(slug = rule.slug, "achievements: slug not in catalog; skipping");
            continue;
        };
        if earned.contains(&achievement.id) {
            continue;
        }

        let value = if let Some(v) = metrics.get(&rule.metric) {
            *v
        } else {
            let v = crowdcast_db::fetch_achievement_metric(pool, user_id, rule.metric).await?;
            metrics.insert(rule.metric, v);
            v
        };

        if !rule.is_met(value) {
            continue;
        }

        if crowdcast_db::grant_achievement(pool, user_id, achievement).await? {
            tracing::info!(
                %user_id,
                slug = rule.slug,
                xp = achievement.xp_reward,
                "achievements: granted"
            );
            outcome.granted.push(rule.slug.to_string());
        }
    }

    Ok(outcome)
}

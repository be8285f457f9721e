//! Live integration tests for crowdcast-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::{Duration, NaiveDate, Utc};
use crowdcast_core::achievements::AchievementMetric;
use crowdcast_core::{AchievementConfig, PollStatus, StreakState};
use crowdcast_db::{
    close_expired_polls, fetch_achievement_metric, get_poll_share_card, get_streak,
    grant_achievement, insert_streak_if_absent, list_achievements, list_active_polls,
    list_earned_achievement_ids, load_recent_activity, reset_broken_streaks, seed_achievements,
    update_streak_if_unchanged, update_trending_score, DbError,
};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_profile(pool: &PgPool, username: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("INSERT INTO profiles (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("insert_profile failed for '{username}': {e}"))
}

async fn insert_poll(
    pool: &PgPool,
    creator_id: Uuid,
    status: PollStatus,
    age: Duration,
    closes_in: Option<Duration>,
) -> Uuid {
    let now = Utc::now();
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO polls (creator_id, question, status, created_at, closes_at) \
         VALUES ($1, 'Pineapple on pizza?', $2, $3, $4) RETURNING id",
    )
    .bind(creator_id)
    .bind(status.as_str())
    .bind(now - age)
    .bind(closes_in.map(|d| now + d))
    .fetch_one(pool)
    .await
    .expect("insert poll")
}

async fn insert_vote(pool: &PgPool, poll_id: Uuid, user_id: Uuid, ago: Duration) {
    sqlx::query("INSERT INTO votes (poll_id, user_id, created_at) VALUES ($1, $2, $3)")
        .bind(poll_id)
        .bind(user_id)
        .bind(Utc::now() - ago)
        .execute(pool)
        .await
        .expect("insert vote");
}

async fn insert_comment(pool: &PgPool, poll_id: Uuid, user_id: Uuid, ago: Duration) {
    sqlx::query(
        "INSERT INTO poll_comments (poll_id, user_id, body, created_at) VALUES ($1, $2, 'hm', $3)",
    )
    .bind(poll_id)
    .bind(user_id)
    .bind(Utc::now() - ago)
    .execute(pool)
    .await
    .expect("insert comment");
}

async fn poll_status(pool: &PgPool, poll_id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM polls WHERE id = $1")
        .bind(poll_id)
        .fetch_one(pool)
        .await
        .expect("poll status")
}

async fn metric(pool: &PgPool, user: Uuid, m: AchievementMetric) -> Result<i64, DbError> {
    fetch_achievement_metric(pool, user, m).await
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn catalog_entry(slug: &str, xp: i32) -> AchievementConfig {
    AchievementConfig {
        slug: slug.to_string(),
        name: format!("Name {slug}"),
        description: format!("Description {slug}"),
        icon: Some("*".to_string()),
        xp_reward: xp,
    }
}

// ---------------------------------------------------------------------------
// polls
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_active_polls_skips_drafts_and_closed(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let active = insert_poll(&pool, user, PollStatus::Active, Duration::hours(1), None).await;
    insert_poll(&pool, user, PollStatus::Draft, Duration::hours(1), None).await;
    insert_poll(&pool, user, PollStatus::Closed, Duration::hours(1), None).await;

    let polls = list_active_polls(&pool).await.expect("list");
    assert_eq!(polls.len(), 1);
    assert_eq!(polls[0].id, active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn recent_activity_counts_only_inside_window(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let poll = insert_poll(&pool, user, PollStatus::Active, Duration::hours(5), None).await;
    let quiet = insert_poll(&pool, user, PollStatus::Active, Duration::hours(5), None).await;

    insert_vote(&pool, poll, user, Duration::minutes(5)).await;
    insert_vote(&pool, poll, user, Duration::minutes(30)).await;
    insert_vote(&pool, poll, user, Duration::minutes(90)).await;
    insert_comment(&pool, poll, user, Duration::minutes(10)).await;

    let since = Utc::now() - Duration::minutes(60);
    let counts = load_recent_activity(&pool, &[poll, quiet], since)
        .await
        .expect("counts");

    let c = counts.get(&poll).expect("poll has activity");
    assert_eq!(c.votes, 2);
    assert_eq!(c.comments, 1);
    assert_eq!(c.reactions, 0);
    assert!(!counts.contains_key(&quiet));
}

#[sqlx::test(migrations = "../../migrations")]
async fn recent_activity_with_no_polls_is_empty(pool: PgPool) {
    let counts = load_recent_activity(&pool, &[], Utc::now())
        .await
        .expect("counts");
    assert!(counts.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_trending_score_reports_missing_poll(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let poll = insert_poll(&pool, user, PollStatus::Active, Duration::hours(1), None).await;

    assert!(update_trending_score(&pool, poll, 12.5).await.expect("update"));
    assert!(!update_trending_score(&pool, Uuid::new_v4(), 1.0)
        .await
        .expect("update"));

    let stored: f64 = sqlx::query_scalar("SELECT trending_score FROM polls WHERE id = $1")
        .bind(poll)
        .fetch_one(&pool)
        .await
        .expect("score");
    assert!((stored - 12.5).abs() < f64::EPSILON);
}

#[sqlx::test(migrations = "../../migrations")]
async fn close_expired_polls_only_touches_past_deadlines(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let expired = insert_poll(&pool, user, PollStatus::Active, Duration::days(2), Some(Duration::hours(-1))).await;
    let open = insert_poll(&pool, user, PollStatus::Active, Duration::days(2), Some(Duration::hours(1))).await;
    let no_deadline = insert_poll(&pool, user, PollStatus::Active, Duration::days(2), None).await;
    let draft = insert_poll(&pool, user, PollStatus::Draft, Duration::days(2), Some(Duration::hours(-1))).await;

    let closed = close_expired_polls(&pool, Utc::now()).await.expect("close");
    assert_eq!(closed, 1);
    assert_eq!(poll_status(&pool, expired).await, PollStatus::Closed.as_str());
    assert_eq!(poll_status(&pool, open).await, PollStatus::Active.as_str());
    assert_eq!(poll_status(&pool, no_deadline).await, PollStatus::Active.as_str());
    assert_eq!(poll_status(&pool, draft).await, PollStatus::Draft.as_str());

    assert_eq!(close_expired_polls(&pool, Utc::now()).await.expect("close"), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn share_card_joins_creator_username(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let poll = insert_poll(&pool, user, PollStatus::Active, Duration::hours(1), None).await;

    let card = get_poll_share_card(&pool, poll).await.expect("card");
    assert_eq!(card.question, "Pineapple on pizza?");
    assert_eq!(card.creator_username.as_deref(), Some("ada"));

    let missing = get_poll_share_card(&pool, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(DbError::NotFound)));
}

// ---------------------------------------------------------------------------
// streaks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn streak_insert_is_first_writer_wins(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let first = StreakState {
        current_streak: 1,
        longest_streak: 1,
        last_vote_date: date(2025, 3, 10),
    };

    assert!(insert_streak_if_absent(&pool, user, &first).await.expect("insert"));
    assert!(!insert_streak_if_absent(&pool, user, &first).await.expect("insert"));

    let row = get_streak(&pool, user).await.expect("get").expect("row");
    assert_eq!(row.state(), first);
}

#[sqlx::test(migrations = "../../migrations")]
async fn streak_update_is_guarded_by_last_vote_date(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    let start = StreakState {
        current_streak: 5,
        longest_streak: 5,
        last_vote_date: date(2025, 3, 9),
    };
    insert_streak_if_absent(&pool, user, &start).await.expect("insert");

    let next = StreakState {
        current_streak: 6,
        longest_streak: 6,
        last_vote_date: date(2025, 3, 10),
    };
    assert!(update_streak_if_unchanged(&pool, user, date(2025, 3, 9), &next)
        .await
        .expect("update"));
    // A second writer that read the old row loses.
    assert!(!update_streak_if_unchanged(&pool, user, date(2025, 3, 9), &next)
        .await
        .expect("update"));

    let row = get_streak(&pool, user).await.expect("get").expect("row");
    assert_eq!(row.current_streak, 6);
    assert_eq!(row.longest_streak, 6);
}

#[sqlx::test(migrations = "../../migrations")]
async fn reset_broken_streaks_keeps_longest(pool: PgPool) {
    let stale = insert_profile(&pool, "stale").await;
    let fresh = insert_profile(&pool, "fresh").await;
    let idle = insert_profile(&pool, "idle").await;

    for (user, current, last) in [
        (stale, 4, date(2025, 3, 1)),
        (fresh, 2, date(2025, 3, 9)),
        (idle, 0, date(2025, 1, 1)),
    ] {
        let state = StreakState {
            current_streak: current,
            longest_streak: 9,
            last_vote_date: last,
        };
        insert_streak_if_absent(&pool, user, &state).await.expect("insert");
    }

    let reset = reset_broken_streaks(&pool, date(2025, 3, 9)).await.expect("reset");
    assert_eq!(reset, 1);

    let row = get_streak(&pool, stale).await.expect("get").expect("row");
    assert_eq!(row.current_streak, 0);
    assert_eq!(row.longest_streak, 9);

    let row = get_streak(&pool, fresh).await.expect("get").expect("row");
    assert_eq!(row.current_streak, 2);
}

// ---------------------------------------------------------------------------
// achievements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn seed_achievements_upserts_by_slug(pool: PgPool) {
    let n = seed_achievements(&pool, &[catalog_entry("first_vote", 10), catalog_entry("streak_7", 70)])
        .await
        .expect("seed");
    assert_eq!(n, 2);

    let before = list_achievements(&pool).await.expect("list");
    let first_vote_id = before.iter().find(|a| a.slug == "first_vote").expect("row").id;

    seed_achievements(&pool, &[catalog_entry("first_vote", 15)])
        .await
        .expect("reseed");

    let after = list_achievements(&pool).await.expect("list");
    assert_eq!(after.len(), 2);
    let row = after.iter().find(|a| a.slug == "first_vote").expect("row");
    assert_eq!(row.id, first_vote_id);
    assert_eq!(row.xp_reward, 15);
}

#[sqlx::test(migrations = "../../migrations")]
async fn grant_achievement_is_exactly_once(pool: PgPool) {
    let user = insert_profile(&pool, "ada").await;
    seed_achievements(&pool, &[catalog_entry("first_vote", 10)])
        .await
        .expect("seed");
    let achievement = list_achievements(&pool)
        .await
        .expect("list")
        .into_iter()
        .next()
        .expect("row");

    assert!(grant_achievement(&pool, user, &achievement).await.expect("grant"));
    assert!(!grant_achievement(&pool, user, &achievement).await.expect("grant"));

    let xp: i32 = sqlx::query_scalar("SELECT xp FROM profiles WHERE id = $1")
        .bind(user)
        .fetch_one(&pool)
        .await
        .expect("xp");
    assert_eq!(xp, 10);

    let notifications: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND type = 'achievement'",
    )
    .bind(user)
    .fetch_one(&pool)
    .await
    .expect("notifications");
    assert_eq!(notifications, 1);

    let title: String = sqlx::query_scalar("SELECT title FROM notifications WHERE user_id = $1")
        .bind(user)
        .fetch_one(&pool)
        .await
        .expect("title");
    assert_eq!(title, "Achievement unlocked: Name first_vote");

    let earned = list_earned_achievement_ids(&pool, user).await.expect("earned");
    assert_eq!(earned, vec![achievement.id]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn metrics_count_user_activity(pool: PgPool) {
    let ada = insert_profile(&pool, "ada").await;
    let bob = insert_profile(&pool, "bob").await;
    let poll = insert_poll(&pool, ada, PollStatus::Active, Duration::hours(1), None).await;
    insert_vote(&pool, poll, bob, Duration::minutes(1)).await;
    insert_comment(&pool, poll, bob, Duration::minutes(1)).await;
    sqlx::query("INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)")
        .bind(bob)
        .bind(ada)
        .execute(&pool)
        .await
        .expect("follow");
    sqlx::query("UPDATE polls SET total_votes = 1500 WHERE id = $1")
        .bind(poll)
        .execute(&pool)
        .await
        .expect("bump votes");

    assert_eq!(metric(&pool, ada, AchievementMetric::PollsCreated).await.expect("m"), 1);
    assert_eq!(metric(&pool, ada, AchievementMetric::Followers).await.expect("m"), 1);
    assert_eq!(metric(&pool, ada, AchievementMetric::ViralPolls).await.expect("m"), 1);
    assert_eq!(metric(&pool, ada, AchievementMetric::VotesCast).await.expect("m"), 0);
    assert_eq!(metric(&pool, bob, AchievementMetric::VotesCast).await.expect("m"), 1);
    assert_eq!(metric(&pool, bob, AchievementMetric::Comments).await.expect("m"), 1);
    assert_eq!(metric(&pool, bob, AchievementMetric::CommunitiesCreated).await.expect("m"), 0);
    assert_eq!(metric(&pool, bob, AchievementMetric::CurrentStreak).await.expect("m"), 0);
}

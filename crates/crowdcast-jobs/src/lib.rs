//! Engagement jobs for Crowdcast.
//!
//! Three independent, stateless runs over the shared Postgres pool:
//! trending score recompute (plus closing expired polls), voting streak
//! maintenance, and achievement grants. Each run is safe to repeat; callers
//! (HTTP handlers, the cron scheduler, the CLI) own any retry policy.

pub mod achievements;
pub mod error;
pub mod streaks;
pub mod trending;

pub use achievements::{grant_achievements, AchievementOutcome};
pub use error::JobError;
pub use streaks::{reset_broken_streaks, update_user_streak, StreakReport};
pub use trending::{run_trending, TrendingOutcome};

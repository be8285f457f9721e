//! Poll lifecycle and the trending score formula.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Width of the trailing window that counts as "recent" activity.
pub const RECENT_ACTIVITY_WINDOW_MINUTES: i64 = 60;

const VOTE_WEIGHT: f64 = 10.0;
const COMMENT_WEIGHT: f64 = 5.0;
const REACTION_WEIGHT: f64 = 2.0;
const BASELINE_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Draft,
    Active,
    Closed,
}

impl PollStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PollStatus::Draft => "draft",
            PollStatus::Active => "active",
            PollStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PollStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PollStatus::Draft),
            "active" => Ok(PollStatus::Active),
            "closed" => Ok(PollStatus::Closed),
            other => Err(format!("unknown poll status '{other}'")),
        }
    }
}

/// Per-poll event counts inside the recent-activity window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub votes: i64,
    pub comments: i64,
    pub reactions: i64,
}

/// Unrounded trending score.
///
/// `score = (votes*10 + comments*5 + reactions*2 + log2(total_votes + 1)*2) / log2(age_hours + 2)`
///
/// Negative inputs (clock skew on `age`, corrupt counters) are clamped to zero,
/// so the penalty is always `>= 1` and the score is never negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn raw_trending_score(recent: ActivityCounts, total_votes: i64, age: Duration) -> f64 {
    let age_hours = (age.num_milliseconds() as f64 / 3_600_000.0).max(0.0);
    let age_penalty = (age_hours + 2.0).log2();

    let baseline = (total_votes.max(0) as f64 + 1.0).log2() * BASELINE_WEIGHT;
    let numerator = recent.votes.max(0) as f64 * VOTE_WEIGHT
        + recent.comments.max(0) as f64 * COMMENT_WEIGHT
        + recent.reactions.max(0) as f64 * REACTION_WEIGHT
        + baseline;

    numerator / age_penalty
}

/// Trending score rounded to two decimal places, as persisted on the poll.
#[must_use]
pub fn trending_score(recent: ActivityCounts, total_votes: i64, age: Duration) -> f64 {
    round_to_hundredths(raw_trending_score(recent, total_votes, age))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Achievement rules and the catalog seed file.
//!
//! The catalog rows (name, description, icon, XP reward) live in the
//! `achievements` table and are seeded from YAML. The thresholds that unlock
//! them are fixed here and reference catalog rows by slug.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("static slug regex is valid"));

/// The user action that prompted an achievement check.
///
/// Each variant selects one family of rules. Unrecognized event names
/// deserialize to [`AchievementEvent::Other`], which selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementEvent {
    PollCreated,
    Vote,
    CommunityCreated,
    NewFollower,
    Comment,
    #[serde(other)]
    Other,
}

impl std::str::FromStr for AchievementEvent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "poll_created" => AchievementEvent::PollCreated,
            "vote" => AchievementEvent::Vote,
            "community_created" => AchievementEvent::CommunityCreated,
            "new_follower" => AchievementEvent::NewFollower,
            "comment" => AchievementEvent::Comment,
            _ => AchievementEvent::Other,
        })
    }
}

impl AchievementEvent {
    /// Interpret an optional caller-supplied event name.
    ///
    /// A missing or blank name means "no hint" and selects every rule;
    /// anything else is parsed, with unknown names becoming [`Self::Other`].
    #[must_use]
    pub fn from_hint(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim).filter(|s| !s.is_empty()).map(|s| match s.parse() {
            Ok(event) => event,
            Err(never) => match never {},
        })
    }
}

/// A per-user aggregate that a rule compares against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementMetric {
    PollsCreated,
    VotesCast,
    CommunitiesCreated,
    Followers,
    CurrentStreak,
    Comments,
    /// Polls created by the user with at least [`VIRAL_POLL_VOTES`] total votes.
    ViralPolls,
}

/// Total votes at which a poll counts as viral.
pub const VIRAL_POLL_VOTES: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementRule {
    pub slug: &'static str,
    pub event: AchievementEvent,
    pub metric: AchievementMetric,
    pub threshold: i64,
}

impl AchievementRule {
    #[must_use]
    pub fn is_met(&self, value: i64) -> bool {
        value >= self.threshold
    }
}

const fn rule(
    slug: &'static str,
    event: AchievementEvent,
    metric: AchievementMetric,
    threshold: i64,
) -> AchievementRule {
    AchievementRule {
        slug,
        event,
        metric,
        threshold,
    }
}

/// Every rule, in the order grants are evaluated and reported.
pub const ACHIEVEMENT_RULES: &[AchievementRule] = &[
    rule("first_poll", AchievementEvent::PollCreated, AchievementMetric::PollsCreated, 1),
    rule("ten_polls", AchievementEvent::PollCreated, AchievementMetric::PollsCreated, 10),
    rule("first_vote", AchievementEvent::Vote, AchievementMetric::VotesCast, 1),
    rule("hundred_votes", AchievementEvent::Vote, AchievementMetric::VotesCast, 100),
    rule(
        "first_community",
        AchievementEvent::CommunityCreated,
        AchievementMetric::CommunitiesCreated,
        1,
    ),
    rule("first_follower", AchievementEvent::NewFollower, AchievementMetric::Followers, 1),
    rule("hundred_followers", AchievementEvent::NewFollower, AchievementMetric::Followers, 100),
    rule("streak_7", AchievementEvent::Vote, AchievementMetric::CurrentStreak, 7),
    rule("streak_30", AchievementEvent::Vote, AchievementMetric::CurrentStreak, 30),
    rule("streak_100", AchievementEvent::Vote, AchievementMetric::CurrentStreak, 100),
    rule("commenter", AchievementEvent::Comment, AchievementMetric::Comments, 50),
    rule("viral_poll", AchievementEvent::Vote, AchievementMetric::ViralPolls, 1),
];

/// Rules to evaluate for an optional event hint.
///
/// `None` selects every rule (full re-evaluation); an event selects only its
/// family.
pub fn rules_for(event: Option<AchievementEvent>) -> impl Iterator<Item = &'static AchievementRule> {
    ACHIEVEMENT_RULES
        .iter()
        .filter(move |r| event.is_none_or(|e| r.event == e))
}

/// One catalog entry as written in the seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementConfig {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub icon: Option<String>,
    pub xp_reward: i32,
}

#[derive(Debug, Deserialize)]
pub struct AchievementsFile {
    pub achievements: Vec<AchievementConfig>,
}

/// Load and validate the achievement catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_achievements(path: &Path) -> Result<AchievementsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AchievementsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: AchievementsFile = serde_yaml::from_str(&content)?;
    validate_achievements(&file)?;
    Ok(file)
}

fn validate_achievements(file: &AchievementsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &file.achievements {
        if !SLUG_RE.is_match(&entry.slug) {
            return Err(ConfigError::Validation(format!(
                "achievement slug '{}' must match [a-z0-9_]+",
                entry.slug
            )));
        }

        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "achievement '{}' has an empty name",
                entry.slug
            )));
        }

        if entry.xp_reward < 0 {
            return Err(ConfigError::Validation(format!(
                "achievement '{}' has negative xp_reward {}",
                entry.slug, entry.xp_reward
            )));
        }

        if !seen.insert(entry.slug.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate achievement slug: '{}'",
                entry.slug
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "achievements_test.rs"]
mod tests;

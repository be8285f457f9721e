pub mod achievements;
pub mod app_config;
pub mod config;
pub mod polls;
pub mod share_card;
pub mod streaks;

pub use achievements::{
    load_achievements, rules_for, AchievementConfig, AchievementEvent, AchievementMetric,
    AchievementRule, AchievementsFile, ACHIEVEMENT_RULES,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use polls::{trending_score, ActivityCounts, PollStatus, RECENT_ACTIVITY_WINDOW_MINUTES};
pub use share_card::{render_share_card, ShareCard};
pub use streaks::{advance_streak, StreakState, StreakTransition};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read achievements file {path}: {source}")]
    AchievementsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse achievements file: {0}")]
    AchievementsFileParse(#[from] serde_yaml::Error),

    #[error("achievements validation failed: {0}")]
    Validation(String),
}

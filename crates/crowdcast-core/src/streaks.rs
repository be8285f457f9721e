//! Consecutive-day voting streaks.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_vote_date: NaiveDate,
}

/// Outcome of recording a vote on `today` against a user's stored streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// No record existed; a streak of one starts today.
    Started(StreakState),
    /// Already counted today.
    Unchanged,
    /// Last vote was yesterday; the streak grows by one.
    Continued(StreakState),
    /// A gap of two or more days; the streak starts over at one.
    Restarted(StreakState),
}

impl StreakTransition {
    /// The state to persist, or `None` when nothing changes.
    #[must_use]
    pub fn next_state(&self) -> Option<StreakState> {
        match self {
            StreakTransition::Started(s)
            | StreakTransition::Continued(s)
            | StreakTransition::Restarted(s) => Some(*s),
            StreakTransition::Unchanged => None,
        }
    }
}

/// Compute the streak transition for a vote cast on `today`.
///
/// `longest_streak` never decreases and always ends `>= current_streak`.
#[must_use]
pub fn advance_streak(existing: Option<&StreakState>, today: NaiveDate) -> StreakTransition {
    let Some(prev) = existing else {
        return StreakTransition::Started(StreakState {
            current_streak: 1,
            longest_streak: 1,
            last_vote_date: today,
        });
    };

    if prev.last_vote_date == today {
        return StreakTransition::Unchanged;
    }

    if Some(prev.last_vote_date) == yesterday(today) {
        let current = prev.current_streak.saturating_add(1);
        return StreakTransition::Continued(StreakState {
            current_streak: current,
            longest_streak: prev.longest_streak.max(current),
            last_vote_date: today,
        });
    }

    StreakTransition::Restarted(StreakState {
        current_streak: 1,
        longest_streak: prev.longest_streak.max(1),
        last_vote_date: today,
    })
}

#[must_use]
pub fn yesterday(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(1))
}

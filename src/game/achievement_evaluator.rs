use log::trace;

use crate::model::{AchievementId, Achievements, Statistics};

/// A threshold over one statistic. Reaching the threshold exactly unlocks.
pub struct AchievementRule {
    pub id: AchievementId,
    pub threshold: u64,
    metric: fn(&Statistics) -> u64,
}

impl AchievementRule {
    pub fn is_met(&self, statistics: &Statistics) -> bool {
        (self.metric)(statistics) >= self.threshold
    }
}

fn games_won(s: &Statistics) -> u64 {
    u64::from(s.games_won)
}

fn games_played(s: &Statistics) -> u64 {
    u64::from(s.games_played)
}

fn highest_tile(s: &Statistics) -> u64 {
    u64::from(s.highest_tile)
}

fn best_score(s: &Statistics) -> u64 {
    s.best_score
}

pub const RULES: [AchievementRule; 5] = [
    AchievementRule {
        id: AchievementId::FirstWin,
        threshold: 1,
        metric: games_won,
    },
    AchievementRule {
        id: AchievementId::Reach512,
        threshold: 512,
        metric: highest_tile,
    },
    AchievementRule {
        id: AchievementId::Reach2048,
        threshold: 2048,
        metric: highest_tile,
    },
    AchievementRule {
        id: AchievementId::Play100,
        threshold: 100,
        metric: games_played,
    },
    AchievementRule {
        id: AchievementId::HighScore,
        threshold: 10_000,
        metric: best_score,
    },
];

/// Achievements whose rule is met but which are still locked, in rule order.
/// The caller latches them.
pub fn evaluate(statistics: &Statistics, achievements: &Achievements) -> Vec<AchievementId> {
    let unlocked: Vec<AchievementId> = RULES
        .iter()
        .filter(|rule| !achievements.is_unlocked(rule.id) && rule.is_met(statistics))
        .map(|rule| rule.id)
        .collect();
    if !unlocked.is_empty() {
        trace!(target: "achievements", "Newly met: {:?}", unlocked);
    }
    unlocked
}

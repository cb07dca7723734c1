use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AchievementId {
    #[serde(rename = "first-win")]
    FirstWin,
    #[serde(rename = "reach-512")]
    Reach512,
    #[serde(rename = "reach-2048")]
    Reach2048,
    #[serde(rename = "play-100")]
    Play100,
    #[serde(rename = "high-score")]
    HighScore,
}

impl AchievementId {
    pub fn all() -> &'static [AchievementId] {
        &[
            Self::FirstWin,
            Self::Reach512,
            Self::Reach2048,
            Self::Play100,
            Self::HighScore,
        ]
    }

    /// Stable identifier used as the persisted key and by the display.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FirstWin => "first-win",
            Self::Reach512 => "reach-512",
            Self::Reach2048 => "reach-2048",
            Self::Play100 => "play-100",
            Self::HighScore => "high-score",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FirstWin => "First Win",
            Self::Reach512 => "Reach 512",
            Self::Reach2048 => "Reach 2048",
            Self::Play100 => "Play 100 Games",
            Self::HighScore => "High Score",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstWin => "Win your first game",
            Self::Reach512 => "Create a 512 tile",
            Self::Reach2048 => "Create a 2048 tile",
            Self::Play100 => "Finish 100 games",
            Self::HighScore => "Score 10000 points in a single game",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.key() == key)
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unlock flags for the closed achievement set. A flag never goes back to
/// locked once set.
///
/// Persisted as `{"first-win": false, "reach-512": true, ...}`; absent or
/// ill-typed entries read as locked.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievements {
    #[serde(rename = "first-win")]
    #[serde_as(as = "DefaultOnError")]
    first_win: bool,
    #[serde(rename = "reach-512")]
    #[serde_as(as = "DefaultOnError")]
    reach_512: bool,
    #[serde(rename = "reach-2048")]
    #[serde_as(as = "DefaultOnError")]
    reach_2048: bool,
    #[serde(rename = "play-100")]
    #[serde_as(as = "DefaultOnError")]
    play_100: bool,
    #[serde(rename = "high-score")]
    #[serde_as(as = "DefaultOnError")]
    high_score: bool,
}

impl Achievements {
    fn flag_mut(&mut self, id: AchievementId) -> &mut bool {
        match id {
            AchievementId::FirstWin => &mut self.first_win,
            AchievementId::Reach512 => &mut self.reach_512,
            AchievementId::Reach2048 => &mut self.reach_2048,
            AchievementId::Play100 => &mut self.play_100,
            AchievementId::HighScore => &mut self.high_score,
        }
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        match id {
            AchievementId::FirstWin => self.first_win,
            AchievementId::Reach512 => self.reach_512,
            AchievementId::Reach2048 => self.reach_2048,
            AchievementId::Play100 => self.play_100,
            AchievementId::HighScore => self.high_score,
        }
    }

    /// Latches `id` to unlocked. Returns true if it was locked before.
    pub fn unlock(&mut self, id: AchievementId) -> bool {
        let flag = self.flag_mut(id);
        let newly = !*flag;
        *flag = true;
        newly
    }

    pub fn unlocked(&self) -> Vec<AchievementId> {
        AchievementId::all()
            .iter()
            .copied()
            .filter(|id| self.is_unlocked(*id))
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for id in AchievementId::all() {
            assert_eq!(AchievementId::from_key(id.key()), Some(*id));
            assert!(!id.display_name().is_empty());
            assert!(!id.description().is_empty());
        }
        assert_eq!(AchievementId::from_key("reach-4096"), None);
    }

    #[test]
    fn test_unlock_is_a_one_way_latch() {
        let mut achievements = Achievements::default();
        assert!(!achievements.is_unlocked(AchievementId::Reach512));

        assert!(achievements.unlock(AchievementId::Reach512));
        assert!(!achievements.unlock(AchievementId::Reach512));
        assert!(achievements.is_unlocked(AchievementId::Reach512));
        assert_eq!(achievements.unlocked(), vec![AchievementId::Reach512]);
    }

    #[test]
    fn test_persisted_shape_uses_achievement_keys() {
        let mut achievements = Achievements::default();
        achievements.unlock(AchievementId::FirstWin);
        let json = serde_json::to_value(achievements).unwrap();

        assert_eq!(json["first-win"], true);
        assert_eq!(json["reach-512"], false);
        assert_eq!(json["reach-2048"], false);
        assert_eq!(json["play-100"], false);
        assert_eq!(json["high-score"], false);
    }

    #[test]
    fn test_partial_document_keeps_known_flags() {
        let json = r#"{"reach-2048": true, "play-100": "yes", "secret": true}"#;
        let achievements: Achievements = serde_json::from_str(json).unwrap();

        assert!(achievements.is_unlocked(AchievementId::Reach2048));
        assert!(!achievements.is_unlocked(AchievementId::Play100));
        assert_eq!(achievements.unlocked_count(), 1);
    }
}

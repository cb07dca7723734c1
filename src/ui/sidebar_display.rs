use thiserror::Error;

use crate::model::{AchievementId, NotificationView, StatisticsView};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("display target {0:?} is missing")]
    MissingTarget(String),
    #[error("could not write to display: {0}")]
    Output(String),
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Output(err.to_string())
    }
}

/// Widgets the sidebar pushes updates into. Each update redraws one target
/// from scratch; a missing target fails only that update.
pub trait SidebarDisplay {
    fn render_notifications(&mut self, notifications: &[NotificationView])
        -> Result<(), DisplayError>;

    fn render_statistics(&mut self, statistics: &StatisticsView) -> Result<(), DisplayError>;

    fn mark_achievement_unlocked(&mut self, id: AchievementId) -> Result<(), DisplayError>;
}

use super::{AchievementId, NotificationView, StatisticsView};

/// Display updates pushed to the UI collaborator. Each carries everything the
/// widget needs to redraw from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    NotificationsChanged(Vec<NotificationView>),
    StatisticsChanged(StatisticsView),
    AchievementUnlocked(AchievementId),
}

mod achievement;
mod game_event;
mod game_stats;
mod notification;
mod sidebar_event;

pub use achievement::{AchievementId, Achievements};
pub use game_event::{Direction, GameEvent};
pub use game_stats::{Statistics, StatisticsView, MOVE_MILESTONE_INTERVAL, STARTING_TILE};
pub use notification::{
    format_clock_time, Notification, NotificationCategory, NotificationId, NotificationView,
};
pub use sidebar_event::SidebarEvent;

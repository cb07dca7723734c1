use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};
use std::io::Write;

use super::sidebar_display::{DisplayError, SidebarDisplay};
use crate::model::{AchievementId, NotificationView, StatisticsView};

pub const NOTIFICATIONS_TARGET: &str = "notificationsList";
pub const STATISTICS_TARGET: &str = "gamesPlayed";

fn achievement_target(id: AchievementId) -> String {
    format!("achievement-{}", id.key())
}

/// Text rendition of the sidebar. Every update rewrites its section to `out`.
pub struct ConsoleSidebar<W: Write> {
    out: W,
    missing_targets: HashSet<String>,
    unlocked: BTreeSet<AchievementId>,
}

impl<W: Write> ConsoleSidebar<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            missing_targets: HashSet::new(),
            unlocked: BTreeSet::new(),
        }
    }

    /// Pretends the named widget does not exist, so updates to it fail.
    pub fn without_target(mut self, target: impl Into<String>) -> Self {
        self.missing_targets.insert(target.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn require(&self, target: &str) -> Result<(), DisplayError> {
        if self.missing_targets.contains(target) {
            return Err(DisplayError::MissingTarget(target.to_string()));
        }
        Ok(())
    }

    fn format_notification(view: &NotificationView) -> String {
        format!(
            "  #{} [{}] {:<11} {}",
            view.id,
            view.formatted_time,
            view.category.as_str(),
            view.message
        )
    }
}

impl<W: Write> SidebarDisplay for ConsoleSidebar<W> {
    fn render_notifications(
        &mut self,
        notifications: &[NotificationView],
    ) -> Result<(), DisplayError> {
        self.require(NOTIFICATIONS_TARGET)?;
        writeln!(self.out, "== Notifications ({}) ==", notifications.len())?;
        if !notifications.is_empty() {
            let lines = notifications
                .iter()
                .map(Self::format_notification)
                .join("\n");
            writeln!(self.out, "{}", lines)?;
        }
        Ok(())
    }

    fn render_statistics(&mut self, statistics: &StatisticsView) -> Result<(), DisplayError> {
        self.require(STATISTICS_TARGET)?;
        writeln!(self.out, "== Stats ==")?;
        writeln!(
            self.out,
            "  games played: {}\n  win rate: {}%\n  total moves: {}\n  highest tile: {}\n  average score: {}",
            statistics.games_played,
            statistics.win_rate_percent,
            statistics.total_moves,
            statistics.highest_tile,
            statistics.average_score
        )?;
        Ok(())
    }

    fn mark_achievement_unlocked(&mut self, id: AchievementId) -> Result<(), DisplayError> {
        self.require(&achievement_target(id))?;
        self.unlocked.insert(id);
        let badges = AchievementId::all()
            .iter()
            .map(|id| {
                let mark = if self.unlocked.contains(id) { "x" } else { " " };
                format!("[{}] {}", mark, id.display_name())
            })
            .join("  ");
        writeln!(
            self.out,
            "== Achievements ==\n  {}: {}\n  {}",
            id.display_name(),
            id.description(),
            badges
        )?;
        Ok(())
    }
}

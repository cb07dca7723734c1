use log::{trace, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::sidebar_display::{DisplayError, SidebarDisplay};
use crate::destroyable::Destroyable;
use crate::events::{EventObserver, Unsubscriber};
use crate::model::SidebarEvent;

/// Forwards engine display events to a [`SidebarDisplay`]. Failed updates are
/// logged and skipped; later updates still go through.
pub struct SidebarPresenter {
    display: Rc<RefCell<dyn SidebarDisplay>>,
    subscription: Option<Unsubscriber<SidebarEvent>>,
    skipped_updates: Rc<Cell<u32>>,
}

impl Destroyable for SidebarPresenter {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl SidebarPresenter {
    pub fn new(
        display: Rc<RefCell<dyn SidebarDisplay>>,
        sidebar_event_observer: &EventObserver<SidebarEvent>,
    ) -> Self {
        let skipped_updates = Rc::new(Cell::new(0));
        let subscription = {
            let display = Rc::clone(&display);
            let skipped_updates = Rc::clone(&skipped_updates);
            sidebar_event_observer.subscribe(move |event: &SidebarEvent| {
                let Ok(mut display) = display.try_borrow_mut() else {
                    warn!(target: "sidebar", "Display busy; dropped {:?}", event);
                    skipped_updates.set(skipped_updates.get() + 1);
                    return;
                };
                if let Err(err) = Self::apply(&mut *display, event) {
                    warn!(target: "sidebar", "Skipped display update: {}", err);
                    skipped_updates.set(skipped_updates.get() + 1);
                }
            })
        };
        Self {
            display,
            subscription: Some(subscription),
            skipped_updates,
        }
    }

    fn apply(
        display: &mut dyn SidebarDisplay,
        event: &SidebarEvent,
    ) -> Result<(), DisplayError> {
        trace!(target: "sidebar", "Presenting {:?}", event);
        match event {
            SidebarEvent::NotificationsChanged(views) => display.render_notifications(views),
            SidebarEvent::StatisticsChanged(view) => display.render_statistics(view),
            SidebarEvent::AchievementUnlocked(id) => display.mark_achievement_unlocked(*id),
        }
    }

    pub fn display(&self) -> Rc<RefCell<dyn SidebarDisplay>> {
        Rc::clone(&self.display)
    }

    /// Updates that could not be shown.
    pub fn skipped_updates(&self) -> u32 {
        self.skipped_updates.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Channel, EventEmitter};
    use crate::model::{AchievementId, NotificationView, StatisticsView};

    #[derive(Default)]
    struct RecordingDisplay {
        has_statistics_panel: bool,
        log: Vec<String>,
    }

    impl SidebarDisplay for RecordingDisplay {
        fn render_notifications(
            &mut self,
            notifications: &[NotificationView],
        ) -> Result<(), DisplayError> {
            self.log.push(format!("notifications {}", notifications.len()));
            Ok(())
        }

        fn render_statistics(&mut self, statistics: &StatisticsView) -> Result<(), DisplayError> {
            if !self.has_statistics_panel {
                return Err(DisplayError::MissingTarget("gamesPlayed".to_string()));
            }
            self.log.push(format!("games {}", statistics.games_played));
            Ok(())
        }

        fn mark_achievement_unlocked(&mut self, id: AchievementId) -> Result<(), DisplayError> {
            self.log.push(format!("unlocked {}", id));
            Ok(())
        }
    }

    fn statistics_view() -> StatisticsView {
        StatisticsView {
            games_played: 3,
            total_moves: 90,
            highest_tile: 128,
            win_rate_percent: "0.0".to_string(),
            average_score: "400".to_string(),
        }
    }

    fn setup(
        display: RecordingDisplay,
    ) -> (
        Rc<RefCell<RecordingDisplay>>,
        EventEmitter<SidebarEvent>,
        SidebarPresenter,
    ) {
        let display = Rc::new(RefCell::new(display));
        let (emitter, observer) = Channel::<SidebarEvent>::new();
        let presenter = SidebarPresenter::new(display.clone(), &observer);
        (display, emitter, presenter)
    }

    #[test]
    fn test_forwards_each_event_kind() {
        let (display, emitter, presenter) = setup(RecordingDisplay {
            has_statistics_panel: true,
            ..Default::default()
        });
        emitter.emit(SidebarEvent::NotificationsChanged(Vec::new()));
        emitter.emit(SidebarEvent::StatisticsChanged(statistics_view()));
        emitter.emit(SidebarEvent::AchievementUnlocked(AchievementId::Play100));

        assert_eq!(
            display.borrow().log,
            vec!["notifications 0", "games 3", "unlocked play-100"]
        );
        assert_eq!(presenter.skipped_updates(), 0);
    }

    #[test]
    fn test_missing_target_skips_only_that_update() {
        let (display, emitter, presenter) = setup(RecordingDisplay::default());
        emitter.emit(SidebarEvent::StatisticsChanged(statistics_view()));
        emitter.emit(SidebarEvent::AchievementUnlocked(AchievementId::FirstWin));

        assert_eq!(display.borrow().log, vec!["unlocked first-win"]);
        assert_eq!(presenter.skipped_updates(), 1);
    }

    #[test]
    fn test_destroy_stops_forwarding() {
        let (display, emitter, mut presenter) = setup(RecordingDisplay::default());
        presenter.destroy();
        emitter.emit(SidebarEvent::AchievementUnlocked(AchievementId::FirstWin));
        assert!(display.borrow().log.is_empty());
    }
}

use log::debug;
use std::fmt;
use std::str::FromStr;

use crate::game::NotificationEngine;
use crate::model::NotificationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarTab {
    #[default]
    Notifications,
    Stats,
    Achievements,
}

impl SidebarTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            SidebarTab::Notifications => "notifications",
            SidebarTab::Stats => "stats",
            SidebarTab::Achievements => "achievements",
        }
    }
}

impl fmt::Display for SidebarTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SidebarTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notifications" => Ok(SidebarTab::Notifications),
            "stats" => Ok(SidebarTab::Stats),
            "achievements" => Ok(SidebarTab::Achievements),
            other => Err(format!("unknown tab: {}", other)),
        }
    }
}

/// Open/closed state and tab selection of the sidebar, plus the buttons that
/// act on the engine.
pub struct SidebarPanel {
    engine: NotificationEngine,
    open: bool,
    active_tab: SidebarTab,
}

impl SidebarPanel {
    pub fn new(engine: NotificationEngine) -> Self {
        Self {
            engine,
            open: false,
            active_tab: SidebarTab::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active_tab(&self) -> SidebarTab {
        self.active_tab
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        debug!(target: "sidebar", "Sidebar open: {}", self.open);
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Selecting the stats tab redraws statistics so the panel never shows a
    /// stale snapshot.
    pub fn switch_tab(&mut self, tab: SidebarTab) {
        debug!(target: "sidebar", "Switching tab {} -> {}", self.active_tab, tab);
        self.active_tab = tab;
        if tab == SidebarTab::Stats {
            self.engine.render_statistics();
        }
    }

    pub fn clear_all_clicked(&self) {
        self.engine.clear_notifications();
    }

    pub fn close_notification_clicked(&self, id: NotificationId) -> bool {
        self.engine.dismiss_notification(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Channel, EventEmitter, EventObserver};
    use crate::game::scheduler::Scheduler;
    use crate::game::{EngineSettings, ManualScheduler};
    use crate::model::{Direction, GameEvent, SidebarEvent};
    use crate::store::MemoryStore;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    struct Setup {
        panel: Rc<RefCell<SidebarPanel>>,
        scheduler: Rc<ManualScheduler>,
        observer: EventObserver<SidebarEvent>,
        game_emitter: EventEmitter<GameEvent>,
    }

    fn connected_setup() -> Setup {
        let scheduler = Rc::new(ManualScheduler::new());
        let (emitter, observer) = Channel::<SidebarEvent>::new();
        let (game_emitter, game_observer) = Channel::<GameEvent>::new();
        let engine = NotificationEngine::new(
            EngineSettings::default().with_welcome_message(None),
            Rc::new(MemoryStore::new()),
            scheduler.clone(),
            emitter,
        );
        engine.connect(&game_observer);
        Setup {
            panel: Rc::new(RefCell::new(SidebarPanel::new(engine))),
            scheduler,
            observer,
            game_emitter,
        }
    }

    fn setup() -> (SidebarPanel, Rc<RefCell<Vec<SidebarEvent>>>) {
        let (emitter, observer) = Channel::<SidebarEvent>::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = Rc::clone(&events);
        observer.subscribe(move |event: &SidebarEvent| {
            events_clone.borrow_mut().push(event.clone());
        });
        let engine = NotificationEngine::new(
            EngineSettings::default(),
            Rc::new(MemoryStore::new()),
            Rc::new(ManualScheduler::new()),
            emitter,
        );
        engine.start();
        events.borrow_mut().clear();
        (SidebarPanel::new(engine), events)
    }

    #[test]
    fn test_toggle_and_close() {
        let (mut panel, _) = setup();
        assert!(!panel.is_open());
        assert!(panel.toggle());
        assert!(!panel.toggle());
        panel.toggle();
        panel.close();
        assert!(!panel.is_open());
    }

    #[test]
    fn test_switch_to_stats_refreshes_statistics() {
        let (mut panel, events) = setup();
        panel.switch_tab(SidebarTab::Achievements);
        assert!(events.borrow().is_empty());

        panel.switch_tab(SidebarTab::Stats);
        assert_eq!(panel.active_tab(), SidebarTab::Stats);
        assert!(matches!(
            events.borrow().last(),
            Some(SidebarEvent::StatisticsChanged(_))
        ));
    }

    #[test]
    fn test_buttons_act_on_notifications() {
        let (panel, events) = setup();
        let welcome = panel.engine.notifications()[0].id;

        assert!(panel.close_notification_clicked(welcome));
        assert!(!panel.close_notification_clicked(welcome));
        panel.clear_all_clicked();

        assert!(panel.engine.notifications().is_empty());
        assert_eq!(
            events.borrow().last(),
            Some(&SidebarEvent::NotificationsChanged(Vec::new()))
        );
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("Stats".parse::<SidebarTab>(), Ok(SidebarTab::Stats));
        assert!("settings".parse::<SidebarTab>().is_err());
        assert_eq!(SidebarTab::Achievements.to_string(), "achievements");
    }

    #[test]
    fn test_close_button_from_expiry_render() {
        let setup = connected_setup();
        setup
            .game_emitter
            .emit(GameEvent::TileCreated { value: 1024 });
        let second = setup.panel.borrow().engine.notifications()[1].id;

        let panel = Rc::clone(&setup.panel);
        let clicked = Rc::new(Cell::new(false));
        let clicked_clone = Rc::clone(&clicked);
        setup.observer.subscribe(move |event: &SidebarEvent| {
            if let SidebarEvent::NotificationsChanged(_) = event {
                if !clicked_clone.replace(true) {
                    panel.borrow().close_notification_clicked(second);
                }
            }
        });

        setup.scheduler.advance(Duration::from_secs(5));
        assert!(clicked.get());
        assert!(setup.panel.borrow().engine.notifications().is_empty());
        assert_eq!(setup.scheduler.pending_count(), 0);
    }

    #[test]
    fn test_move_reported_during_stats_refresh_is_counted() {
        let setup = connected_setup();
        let game_emitter = setup.game_emitter.clone();
        let reported = Rc::new(Cell::new(false));
        let reported_clone = Rc::clone(&reported);
        setup.observer.subscribe(move |event: &SidebarEvent| {
            if let SidebarEvent::StatisticsChanged(_) = event {
                if !reported_clone.replace(true) {
                    game_emitter.emit(GameEvent::MoveMade {
                        direction: Direction::Right,
                        resulted_in_change: true,
                    });
                }
            }
        });

        setup.panel.borrow_mut().switch_tab(SidebarTab::Stats);
        assert_eq!(setup.panel.borrow().engine.statistics().total_moves, 1);
    }
}

use log::{info, trace, warn};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::achievement_evaluator;
use super::notification_queue::NotificationQueue;
use super::scheduler::Scheduler;
use super::settings::EngineSettings;
use super::stats_manager::{RestoreReport, StatsManager};
use crate::destroyable::Destroyable;
use crate::events::{DeferredEmitter, EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    Achievements, Direction, GameEvent, NotificationCategory, NotificationId, NotificationView,
    SidebarEvent, Statistics, StatisticsView,
};
use crate::store::KeyValueStore;

const LOAD_ERROR_MESSAGE: &str = "Error loading saved data";

struct EngineState {
    statistics: Statistics,
    achievements: Achievements,
    persist_failures: u32,
}

struct EngineCore {
    settings: EngineSettings,
    stats_manager: StatsManager,
    state: RefCell<EngineState>,
    queue: Rc<RefCell<NotificationQueue>>,
    outbox: DeferredEmitter<SidebarEvent>,
    backlog: RefCell<VecDeque<GameEvent>>,
    settling: Cell<bool>,
    game_event_subscription: RefCell<Option<Unsubscriber<GameEvent>>>,
}

/// Turns game events into statistics, achievements and notifications, and
/// keeps the store in sync. Clones share one engine.
///
/// Every event runs the same pipeline to completion: update statistics,
/// notify on milestones, evaluate achievements, persist, re-render. Persisting
/// comes last, so a store failure never undoes in-memory state.
///
/// Display events are held back until the pipeline has finished and every
/// borrow is released, so sidebar listeners may call any engine method.
/// Game events that arrive meanwhile wait in a backlog and run afterwards, in
/// arrival order.
#[derive(Clone)]
pub struct NotificationEngine {
    core: Rc<EngineCore>,
}

impl Destroyable for NotificationEngine {
    fn destroy(&mut self) {
        let subscription = self.core.game_event_subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        self.core.backlog.borrow_mut().clear();
        self.core.queue.borrow_mut().destroy();
    }
}

impl NotificationEngine {
    pub fn new(
        settings: EngineSettings,
        store: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
        sidebar_event_emitter: EventEmitter<SidebarEvent>,
    ) -> Self {
        let outbox = DeferredEmitter::new(sidebar_event_emitter);
        let queue = NotificationQueue::new(
            settings.queue_capacity,
            settings.auto_dismiss_after(),
            scheduler,
            outbox.clone(),
        );
        let core = EngineCore {
            stats_manager: StatsManager::new(store, &settings),
            settings,
            state: RefCell::new(EngineState {
                statistics: Statistics::default(),
                achievements: Achievements::default(),
                persist_failures: 0,
            }),
            queue,
            outbox,
            backlog: RefCell::new(VecDeque::new()),
            settling: Cell::new(false),
            game_event_subscription: RefCell::new(None),
        };
        Self {
            core: Rc::new(core),
        }
    }

    /// Feeds the engine every event sent on `game_event_observer`. The
    /// subscription holds the engine weakly.
    pub fn connect(&self, game_event_observer: &EventObserver<GameEvent>) {
        let core = Rc::downgrade(&self.core);
        let subscription = game_event_observer.subscribe(move |event: &GameEvent| {
            let Some(core) = core.upgrade() else {
                return;
            };
            NotificationEngine { core }.submit(event.clone());
        });
        let previous = self
            .core
            .game_event_subscription
            .borrow_mut()
            .replace(subscription);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    /// Posts the welcome message and restores persisted records.
    pub fn start(&self) -> RestoreReport {
        if let Some(message) = self.core.settings.welcome_message.clone() {
            self.notify(message, NotificationCategory::Info);
        }
        self.restore()
    }

    /// Replaces in-memory records with the stored ones (per-record fallback to
    /// defaults) and re-syncs the display.
    pub fn restore(&self) -> RestoreReport {
        let restored = self.core.stats_manager.restore();
        {
            let mut state = self.core.state.borrow_mut();
            state.statistics = restored.statistics;
            state.achievements = restored.achievements;
        }

        if restored.report.has_failures() {
            self.notify(LOAD_ERROR_MESSAGE, NotificationCategory::Info);
        }
        for id in restored.achievements.unlocked() {
            self.core.outbox.post(SidebarEvent::AchievementUnlocked(id));
        }
        self.post_statistics();
        self.settle();
        restored.report
    }

    pub fn on_move(&self, direction: Direction, moved: bool) {
        self.submit(GameEvent::MoveMade {
            direction,
            resulted_in_change: moved,
        });
    }

    pub fn on_tile_created(&self, value: u32) {
        self.submit(GameEvent::TileCreated { value });
    }

    pub fn on_game_ended(&self, won: bool, final_score: u64, final_highest_tile: u32) {
        self.submit(GameEvent::GameEnded {
            won,
            final_score,
            final_highest_tile,
        });
    }

    fn submit(&self, event: GameEvent) {
        self.core.backlog.borrow_mut().push_back(event);
        self.settle();
    }

    // Delivers held-back display events, then runs queued game events, until
    // both are empty. A nested call leaves the work to the running one.
    fn settle(&self) {
        if self.core.settling.replace(true) {
            trace!(target: "engine", "Pipeline running; work left to it");
            return;
        }
        loop {
            self.core.outbox.flush();
            let next = self.core.backlog.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.process(&event);
        }
        self.core.settling.set(false);
    }

    fn process(&self, event: &GameEvent) {
        trace!(target: "engine", "Processing {:?}", event);
        let changed = match *event {
            GameEvent::MoveMade {
                resulted_in_change, ..
            } => self.record_move(resulted_in_change),
            GameEvent::TileCreated { value } => self.record_tile(value),
            GameEvent::GameEnded {
                won,
                final_score,
                final_highest_tile,
            } => {
                self.core
                    .state
                    .borrow_mut()
                    .statistics
                    .apply_game_ended(won, final_score);
                self.record_tile(final_highest_tile);
                true
            }
        };
        if changed {
            self.check_achievements();
            self.persist();
            self.post_statistics();
        }
    }

    fn record_move(&self, moved: bool) -> bool {
        if !moved {
            return false;
        }
        let milestone = {
            let mut state = self.core.state.borrow_mut();
            let reached = state.statistics.apply_move(true);
            reached.then_some(state.statistics.total_moves)
        };
        if let Some(total_moves) = milestone {
            let message = format!("You've made {} moves!", total_moves);
            self.notify(message, NotificationCategory::Info);
        }
        true
    }

    fn record_tile(&self, value: u32) -> bool {
        let raised = self
            .core
            .state
            .borrow_mut()
            .statistics
            .apply_tile_created(value);
        if raised && value >= self.core.settings.tile_notify_threshold {
            self.notify(
                format!("New highest tile: {}", value),
                NotificationCategory::Success,
            );
        }
        raised
    }

    fn check_achievements(&self) {
        let unlocked = {
            let mut state = self.core.state.borrow_mut();
            let unlocked = achievement_evaluator::evaluate(&state.statistics, &state.achievements);
            for id in &unlocked {
                state.achievements.unlock(*id);
            }
            unlocked
        };
        for id in unlocked {
            info!(target: "engine", "Unlocked {}", id);
            self.notify(
                format!("Achievement Unlocked: {}", id.display_name()),
                NotificationCategory::Achievement,
            );
            self.core.outbox.post(SidebarEvent::AchievementUnlocked(id));
        }
    }

    fn persist(&self) {
        let state = self.core.state.borrow();
        let result = self
            .core
            .stats_manager
            .save(&state.statistics, &state.achievements);
        drop(state);
        if let Err(err) = result {
            let mut state = self.core.state.borrow_mut();
            state.persist_failures = state.persist_failures.saturating_add(1);
            warn!(target: "engine", "Could not persist sidebar data: {}", err);
        }
    }

    fn notify(&self, message: impl Into<String>, category: NotificationCategory) -> NotificationId {
        self.core.queue.borrow_mut().enqueue(message, category)
    }

    fn post_statistics(&self) {
        let view = self.statistics_view();
        self.core.outbox.post(SidebarEvent::StatisticsChanged(view));
    }

    pub fn render_statistics(&self) {
        self.post_statistics();
        self.settle();
    }

    pub fn dismiss_notification(&self, id: NotificationId) -> bool {
        let removed = self.core.queue.borrow_mut().dismiss(id);
        self.settle();
        removed
    }

    pub fn clear_notifications(&self) {
        self.core.queue.borrow_mut().clear_all();
        self.settle();
    }

    pub fn statistics(&self) -> Statistics {
        let state = self.core.state.borrow();
        state.statistics
    }

    pub fn statistics_view(&self) -> StatisticsView {
        let state = self.core.state.borrow();
        StatisticsView::from(&state.statistics)
    }

    pub fn achievements(&self) -> Achievements {
        let state = self.core.state.borrow();
        state.achievements
    }

    pub fn notifications(&self) -> Vec<NotificationView> {
        let queue = self.core.queue.borrow();
        queue.views()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.core.settings
    }

    /// Number of events whose persistence step failed.
    pub fn persist_failures(&self) -> u32 {
        let state = self.core.state.borrow();
        state.persist_failures
    }
}

impl EventHandler<GameEvent> for NotificationEngine {
    fn handle_event(&mut self, event: &GameEvent) {
        self.submit(event.clone());
    }
}

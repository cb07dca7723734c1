pub mod achievement_evaluator;
pub mod engine;
pub mod notification_queue;
pub mod scheduler;
pub mod settings;
pub mod stats_manager;

pub use engine::NotificationEngine;
pub use notification_queue::NotificationQueue;
pub use scheduler::{ManualScheduler, Scheduler, TimerId, TimerTask};
pub use settings::EngineSettings;
pub use stats_manager::{RecordStatus, RestoreReport, StatsManager};

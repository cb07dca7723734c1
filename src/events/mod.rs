mod channel;
mod deferred_emitter;
mod event_handler;

pub use channel::{Channel, EventEmitter, EventObserver, SubscriptionId, Unsubscriber};
pub use deferred_emitter::DeferredEmitter;
pub use event_handler::EventHandler;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use log::trace;

pub type Callback<T> = Rc<dyn Fn(&T)>;
pub type SubscriptionId = u64;

type Listeners<T> = RefCell<BTreeMap<SubscriptionId, Callback<T>>>;

/// Sending half of a [`Channel`].
pub struct EventEmitter<T: Debug> {
    channel: Channel<T>,
}

impl<T: Debug> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

/// Receiving half of a [`Channel`].
pub struct EventObserver<T: Debug> {
    channel: Channel<T>,
}

impl<T: Debug> Clone for EventObserver<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

/// Handle returned by `subscribe`; dropping it keeps the subscription alive,
/// calling `unsubscribe` removes it.
pub struct Unsubscriber<T: Debug> {
    listeners: Weak<Listeners<T>>,
    id: SubscriptionId,
}

impl<T: Debug> Unsubscriber<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn unsubscribe(self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners.borrow_mut().remove(&self.id).is_some(),
            None => false,
        }
    }
}

/// Single-threaded broadcast channel. Listeners run synchronously, in
/// subscription order, on the emitting call stack.
pub struct Channel<T: Debug> {
    listeners: Rc<Listeners<T>>,
    next_id: Rc<Cell<SubscriptionId>>,
}

impl<T: Debug> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
            next_id: Rc::clone(&self.next_id),
        }
    }
}

impl<T: Debug> Channel<T> {
    pub fn new() -> (EventEmitter<T>, EventObserver<T>) {
        let channel = Channel {
            listeners: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Rc::new(Cell::new(0)),
        };
        (
            EventEmitter {
                channel: channel.clone(),
            },
            EventObserver { channel },
        )
    }

    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, Rc::new(callback));
        Unsubscriber {
            listeners: Rc::downgrade(&self.listeners),
            id,
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }

    pub fn emit(&self, data: T) {
        // Snapshot so listeners may subscribe, unsubscribe or emit again.
        let listeners: Vec<Callback<T>> = self.listeners.borrow().values().cloned().collect();
        trace!(target: "events", "Emitting event to {} listeners: {:?}", listeners.len(), data);
        for listener in listeners {
            listener(&data);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<T: Debug> EventEmitter<T> {
    pub fn emit(&self, data: T) {
        self.channel.emit(data);
    }

    pub fn listener_count(&self) -> usize {
        self.channel.listener_count()
    }
}

impl<T: Debug> EventObserver<T> {
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        self.channel.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }
}

use chrono::Local;
use log::{debug, trace, warn};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::scheduler::{Scheduler, TimerId};
use crate::destroyable::Destroyable;
use crate::events::DeferredEmitter;
use crate::model::{
    Notification, NotificationCategory, NotificationId, NotificationView, SidebarEvent,
};

/// Delay before an expiry that found the queue busy tries again.
const EXPIRY_RETRY_DELAY: Duration = Duration::from_millis(250);

type TimerSlot = Rc<Cell<Option<TimerId>>>;

struct QueueEntry {
    notification: Notification,
    expiry: TimerSlot,
}

/// Bounded list of transient notifications, oldest first.
///
/// Every entry owns its auto-dismiss timer; any removal path (dismiss, clear,
/// eviction) cancels it, and a timer that fires looks the entry up in the live
/// queue. Every change posts a full `NotificationsChanged` render to the
/// outbox. Callers flush the outbox after releasing the queue; expiry timers
/// flush it themselves.
pub struct NotificationQueue {
    entries: VecDeque<QueueEntry>,
    next_id: u64,
    capacity: usize,
    auto_dismiss_after: Duration,
    scheduler: Rc<dyn Scheduler>,
    outbox: DeferredEmitter<SidebarEvent>,
    self_ref: Weak<RefCell<NotificationQueue>>,
}

impl Destroyable for NotificationQueue {
    fn destroy(&mut self) {
        for entry in self.entries.iter() {
            if let Some(timer) = entry.expiry.take() {
                self.scheduler.cancel(timer);
            }
        }
    }
}

struct ExpiryTimer {
    queue: Weak<RefCell<NotificationQueue>>,
    scheduler: Rc<dyn Scheduler>,
    outbox: DeferredEmitter<SidebarEvent>,
    slot: TimerSlot,
    id: NotificationId,
}

impl ExpiryTimer {
    fn arm(self, delay: Duration) {
        let scheduler = Rc::clone(&self.scheduler);
        let slot = Rc::clone(&self.slot);
        let timer = scheduler.schedule_once(delay, Box::new(move || self.fire()));
        slot.set(Some(timer));
    }

    fn fire(self) {
        self.slot.set(None);
        let Some(queue) = self.queue.upgrade() else {
            return;
        };
        let expired = match queue.try_borrow_mut() {
            Ok(mut queue) => {
                queue.expire(self.id);
                true
            }
            Err(_) => false,
        };
        if expired {
            self.outbox.flush();
        } else {
            warn!(target: "notifications", "Queue busy; retrying expiry of {}", self.id);
            self.arm(EXPIRY_RETRY_DELAY);
        }
    }
}

impl NotificationQueue {
    pub fn new(
        capacity: usize,
        auto_dismiss_after: Duration,
        scheduler: Rc<dyn Scheduler>,
        outbox: DeferredEmitter<SidebarEvent>,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|self_ref| {
            RefCell::new(Self {
                entries: VecDeque::new(),
                next_id: 1,
                capacity: capacity.max(1),
                auto_dismiss_after,
                scheduler,
                outbox,
                self_ref: self_ref.clone(),
            })
        })
    }

    pub fn enqueue(
        &mut self,
        message: impl Into<String>,
        category: NotificationCategory,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;

        let notification = Notification::new(id, message, category, Local::now());
        trace!(target: "notifications", "Enqueue {:?}", notification);

        let expiry: TimerSlot = Rc::new(Cell::new(None));
        self.entries.push_back(QueueEntry {
            notification,
            expiry: Rc::clone(&expiry),
        });
        ExpiryTimer {
            queue: self.self_ref.clone(),
            scheduler: Rc::clone(&self.scheduler),
            outbox: self.outbox.clone(),
            slot: expiry,
            id,
        }
        .arm(self.auto_dismiss_after);

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(target: "notifications", "Evicting {}", evicted.notification.id);
                self.cancel_expiry(&evicted);
            }
        }

        self.render();
        id
    }

    fn cancel_expiry(&self, entry: &QueueEntry) {
        if let Some(timer) = entry.expiry.take() {
            self.scheduler.cancel(timer);
        }
    }

    fn expire(&mut self, id: NotificationId) {
        if let Some(index) = self.position(id) {
            trace!(target: "notifications", "Expired {}", id);
            self.entries.remove(index);
            self.render();
        }
    }

    /// Removes `id` if present. Unknown or already removed ids are ignored.
    /// Returns whether anything was removed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let Some(index) = self.position(id) else {
            trace!(target: "notifications", "Dismiss of unknown {} ignored", id);
            return false;
        };
        if let Some(entry) = self.entries.remove(index) {
            self.cancel_expiry(&entry);
        }
        self.render();
        true
    }

    pub fn clear_all(&mut self) {
        let cleared: Vec<QueueEntry> = self.entries.drain(..).collect();
        for entry in &cleared {
            self.cancel_expiry(entry);
        }
        self.render();
    }

    fn position(&self, id: NotificationId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.notification.id == id)
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().map(|entry| &entry.notification)
    }

    pub fn views(&self) -> Vec<NotificationView> {
        self.notifications().map(Notification::view).collect()
    }

    pub fn render(&self) {
        self.outbox
            .post(SidebarEvent::NotificationsChanged(self.views()));
    }
}

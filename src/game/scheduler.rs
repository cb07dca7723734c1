//! One-shot delayed tasks for the single-threaded event loop.
//!
//! The host event loop owns the real clock; [`ManualScheduler`] is driven by
//! explicit `advance` calls so tests and the console front end control time.

use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

pub type TimerTask = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub trait Scheduler {
    /// Runs `task` once after `delay`, unless cancelled first.
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerId;

    /// Returns true if the task was still pending.
    fn cancel(&self, id: TimerId) -> bool;

    fn pending_count(&self) -> usize;
}

struct PendingTask {
    deadline: Duration,
    task: TimerTask,
}

/// Virtual-time scheduler. Tasks fire in deadline order, ties in scheduling
/// order, and only from inside [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    pending: RefCell<BTreeMap<TimerId, PendingTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Moves the clock forward, running every task that comes due. Tasks
    /// scheduled by a running task fire too if they fall inside the window.
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get().saturating_add(by);
        let mut fired = 0;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let due = pending
                    .iter()
                    .filter(|(_, p)| p.deadline <= target)
                    .min_by_key(|(id, p)| (p.deadline, **id))
                    .map(|(id, _)| *id);
                due.and_then(|id| pending.remove(&id).map(|p| (id, p)))
            };
            // The borrow is released before the task runs so it can cancel
            // or schedule other tasks.
            match next {
                Some((id, pending_task)) => {
                    self.now.set(pending_task.deadline);
                    trace!(target: "scheduler", "Firing {:?} at {:?}", id, pending_task.deadline);
                    (pending_task.task)();
                    fired += 1;
                }
                None => break,
            }
        }
        self.now.set(target);
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let deadline = self.now.get().saturating_add(delay);
        self.pending
            .borrow_mut()
            .insert(id, PendingTask { deadline, task });
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.pending.borrow_mut().remove(&id).is_some()
    }

    fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

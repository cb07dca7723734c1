use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::rc::Rc;

use log::trace;

use super::channel::EventEmitter;

/// Collects events while state is borrowed and emits them later, once the
/// owner has released every borrow. Listeners may then call straight back
/// into the code that posted the event.
pub struct DeferredEmitter<T: Debug> {
    emitter: EventEmitter<T>,
    pending: Rc<RefCell<VecDeque<T>>>,
    flushing: Rc<Cell<bool>>,
}

impl<T: Debug> Clone for DeferredEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            emitter: self.emitter.clone(),
            pending: Rc::clone(&self.pending),
            flushing: Rc::clone(&self.flushing),
        }
    }
}

impl<T: Debug> DeferredEmitter<T> {
    pub fn new(emitter: EventEmitter<T>) -> Self {
        Self {
            emitter,
            pending: Rc::new(RefCell::new(VecDeque::new())),
            flushing: Rc::new(Cell::new(false)),
        }
    }

    pub fn post(&self, event: T) {
        trace!(target: "events", "Deferring {:?}", event);
        self.pending.borrow_mut().push_back(event);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }

    /// Emits pending events in post order. Events posted by listeners during
    /// the flush are delivered by the same flush; a nested call returns 0.
    pub fn flush(&self) -> usize {
        if self.flushing.replace(true) {
            return 0;
        }
        let mut delivered = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.emitter.emit(event);
            delivered += 1;
        }
        self.flushing.set(false);
        delivered
    }
}

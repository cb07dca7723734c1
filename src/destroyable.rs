use std::cell::RefCell;
use std::rc::Rc;

// implemented by types holding scheduled timers or channel subscriptions, which outlive a plain drop
pub trait Destroyable {
    fn destroy(&mut self);
}

impl<T: Destroyable> Destroyable for Rc<RefCell<T>> {
    fn destroy(&mut self) {
        self.borrow_mut().destroy();
    }
}

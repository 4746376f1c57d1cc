//! Ownership scope for subscriptions and derived state.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;

/// Owns whatever keeps a set of derivations alive.
///
/// Pull-style values that subscribe eagerly must be built against a live
/// scope. When the scope is dropped (or [`Scope::end`] is called) every
/// held item is released, most recently held first.
#[derive(Default)]
pub struct Scope {
    held: RefCell<Vec<Box<dyn Any>>>,
}

impl Scope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `item` alive until the scope ends.
    pub fn hold(&self, item: impl Any) {
        self.held.borrow_mut().push(Box::new(item));
    }

    /// Number of held items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.borrow().len()
    }

    /// Whether the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.borrow().is_empty()
    }

    /// End the scope, releasing everything it holds.
    pub fn end(self) {}
}

impl Drop for Scope {
    fn drop(&mut self) {
        let mut held = std::mem::take(self.held.get_mut());
        while let Some(item) = held.pop() {
            drop(item);
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("held", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Subject;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_dropping_scope_releases_subscriptions() {
        let subject = Subject::new();
        let calls = Rc::new(Cell::new(0));

        let scope = Scope::new();
        let counter = Rc::clone(&calls);
        scope.hold(subject.subscribe(move |_: &i32| counter.set(counter.get() + 1)));
        assert_eq!(scope.len(), 1);

        subject.next(1);
        scope.end();
        subject.next(2);

        assert_eq!(calls.get(), 1);
        assert_eq!(subject.observer_count(), 0);
    }
}

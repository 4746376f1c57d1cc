//! RAII subscription guard.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Keeps a callback registered for as long as it is alive.
///
/// Sources only hold weak references to their observers; the strong
/// reference lives here, so dropping the guard is all it takes to
/// unsubscribe.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    keepalive: Option<Rc<dyn Any>>,
}

impl Subscription {
    pub(crate) fn new(keepalive: Rc<dyn Any>) -> Self {
        Self {
            keepalive: Some(keepalive),
        }
    }

    /// A subscription that holds nothing, returned when subscribing to a
    /// source that has already completed.
    pub fn empty() -> Self {
        Self { keepalive: None }
    }

    /// Whether this guard still keeps a callback registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.keepalive.is_some()
    }

    /// Explicitly unsubscribe. Equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.keepalive = None;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribe_releases_keepalive() {
        let held: Rc<dyn Any> = Rc::new(5_u8);
        let weak = Rc::downgrade(&held);
        let sub = Subscription::new(held);
        assert!(sub.is_active());
        sub.unsubscribe();
        assert!(weak.upgrade().is_none());
        assert!(!Subscription::empty().is_active());
    }
}

//! Version-tracked value cell.

use crate::subscription::Subscription;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
    pending: VecDeque<T>,
    delivering: bool,
}

/// A shared value with change notification.
///
/// Setting a value equal to the current one is a no-op: no version bump and
/// no callbacks. Clones share the same underlying cell. A value set from
/// inside a callback is delivered after the current one has reached every
/// subscriber.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a cell holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
                pending: VecDeque::new(),
                delivering: false,
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value.clone();
            inner.version += 1;
            inner.pending.push_back(value);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let (value, callbacks) = {
                let mut inner = self.inner.borrow_mut();
                let Some(value) = inner.pending.pop_front() else {
                    inner.delivering = false;
                    return;
                };
                inner
                    .subscribers
                    .retain(|callback| callback.strong_count() > 0);
                let live: Vec<Rc<Callback<T>>> =
                    inner.subscribers.iter().filter_map(Weak::upgrade).collect();
                (value, live)
            };

            for callback in callbacks {
                callback(&value);
            }
        }
    }

    /// Number of registered callbacks whose subscription is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|callback| callback.strong_count() > 0)
            .count()
    }

    /// Register a change callback.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|entry| entry.strong_count() > 0);
        inner.subscribers.push(Rc::downgrade(&callback));
        drop(inner);
        Subscription::new(Rc::new(callback))
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_bumps_version_and_notifies() {
        let cell = Observable::new(String::new());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = cell.subscribe(move |_| counter.set(counter.get() + 1));

        cell.set("a".to_string());
        assert_eq!(cell.get(), "a");
        assert_eq!(cell.version(), 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_equal_value_is_noop() {
        let cell = Observable::new(3);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = cell.subscribe(move |_| counter.set(counter.get() + 1));

        cell.set(3);
        assert_eq!(cell.version(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_dropped_subscription_is_not_called() {
        let cell = Observable::new(0);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let sub = cell.subscribe(move |_| counter.set(counter.get() + 1));
        drop(sub);

        cell.set(1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let cell = Observable::new(1);
        let other = cell.clone();
        other.set(2);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.with(|v| v * 10), 20);
    }

    #[test]
    fn test_value_set_from_callback_is_delivered_in_order() {
        let cell = Observable::new(0);
        let first_seen = Rc::new(RefCell::new(Vec::new()));
        let second_seen = Rc::new(RefCell::new(Vec::new()));

        let feedback = cell.clone();
        let sink = Rc::clone(&first_seen);
        let _first = cell.subscribe(move |v: &i32| {
            sink.borrow_mut().push(*v);
            if *v == 1 {
                feedback.set(2);
            }
        });
        let sink = Rc::clone(&second_seen);
        let _second = cell.subscribe(move |v: &i32| sink.borrow_mut().push(*v));

        cell.set(1);

        assert_eq!(*first_seen.borrow(), vec![1, 2]);
        assert_eq!(*second_seen.borrow(), vec![1, 2]);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_dropped_subscriptions_do_not_accumulate() {
        let cell = Observable::new(String::from("same"));
        for _ in 0..1000 {
            let sub = cell.subscribe(|_| {});
            drop(sub);
        }
        let _live = cell.subscribe(|_| {});

        assert_eq!(cell.inner.borrow().subscribers.len(), 1);
        assert_eq!(cell.subscriber_count(), 1);
    }
}

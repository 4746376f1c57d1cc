//! Multicast event source.

use crate::subscription::Subscription;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

struct Observer<T> {
    on_next: Box<dyn Fn(&T)>,
    on_complete: Option<Box<dyn Fn()>>,
}

enum Notification<T> {
    Next(T),
    Complete,
}

struct Inner<T> {
    observers: Vec<Weak<Observer<T>>>,
    pending: VecDeque<Notification<T>>,
    delivering: bool,
    /// No further notifications are accepted.
    closed: bool,
    /// Completion has been delivered to every observer.
    terminated: bool,
}

/// A multicast push source.
///
/// Every value passed to [`Subject::next`] is delivered synchronously to
/// all live observers in registration order. Values raised from inside an
/// observer callback are queued and delivered once the current value has
/// reached every observer.
pub struct Subject<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: 'static> Subject<T> {
    /// Create an open subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                observers: Vec::new(),
                pending: VecDeque::new(),
                delivering: false,
                closed: false,
                terminated: false,
            })),
        }
    }

    /// Register a value callback.
    pub fn subscribe(&self, on_next: impl Fn(&T) + 'static) -> Subscription {
        self.register(Observer {
            on_next: Box::new(on_next),
            on_complete: None,
        })
    }

    /// Register a value callback and a completion callback.
    ///
    /// Subscribing to a subject that has already completed invokes
    /// `on_complete` immediately and returns an empty subscription.
    pub fn subscribe_with(
        &self,
        on_next: impl Fn(&T) + 'static,
        on_complete: impl Fn() + 'static,
    ) -> Subscription {
        self.register(Observer {
            on_next: Box::new(on_next),
            on_complete: Some(Box::new(on_complete)),
        })
    }

    fn register(&self, observer: Observer<T>) -> Subscription {
        if self.inner.borrow().terminated {
            if let Some(on_complete) = &observer.on_complete {
                on_complete();
            }
            return Subscription::empty();
        }

        let observer = Rc::new(observer);
        self.inner
            .borrow_mut()
            .observers
            .push(Rc::downgrade(&observer));
        Subscription::new(observer)
    }

    /// Push a value to every observer. Ignored once the subject is closed.
    pub fn next(&self, value: T) {
        self.enqueue(Notification::Next(value));
    }

    /// Complete the subject. Observers get their completion callback and
    /// are released; later values are dropped.
    pub fn complete(&self) {
        self.enqueue(Notification::Complete);
    }

    /// Whether [`Subject::complete`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    /// Number of observers whose subscription is still alive.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner
            .borrow()
            .observers
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    /// Whether notifications are queued behind an in-progress delivery.
    pub(crate) fn has_pending(&self) -> bool {
        !self.inner.borrow().pending.is_empty()
    }

    fn enqueue(&self, notification: Notification<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return;
            }
            if matches!(notification, Notification::Complete) {
                inner.closed = true;
            }
            inner.pending.push_back(notification);
            if inner.delivering {
                trace!(queued = inner.pending.len(), "notification queued behind delivery");
                return;
            }
            inner.delivering = true;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let (notification, observers) = {
                let mut inner = self.inner.borrow_mut();
                let Some(notification) = inner.pending.pop_front() else {
                    inner.delivering = false;
                    return;
                };
                inner.observers.retain(|observer| observer.strong_count() > 0);
                let live: Vec<Rc<Observer<T>>> =
                    inner.observers.iter().filter_map(Weak::upgrade).collect();
                if matches!(notification, Notification::Complete) {
                    inner.observers.clear();
                    inner.terminated = true;
                }
                (notification, live)
            };

            match notification {
                Notification::Next(value) => {
                    for observer in &observers {
                        (observer.on_next)(&value);
                    }
                }
                Notification::Complete => {
                    trace!(observers = observers.len(), "subject completed");
                    for observer in &observers {
                        if let Some(on_complete) = &observer.on_complete {
                            on_complete();
                        }
                    }
                }
            }
        }
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Subject")
            .field("observers", &inner.observers.len())
            .field("pending", &inner.pending.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder() -> (Rc<RefCell<Vec<i32>>>, impl Fn(&i32) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |v: &i32| sink.borrow_mut().push(*v))
    }

    #[test]
    fn test_delivers_to_all_observers_in_order() {
        let subject = Subject::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let _a = subject.subscribe(move |v: &i32| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&order);
        let _b = subject.subscribe(move |v: &i32| second.borrow_mut().push(("b", *v)));

        subject.next(1);
        subject.next(2);

        assert_eq!(
            *order.borrow(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]
        );
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let subject = Subject::new();
        let (seen, sink) = recorder();
        let sub = subject.subscribe(sink);

        subject.next(1);
        drop(sub);
        subject.next(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn test_complete_notifies_and_rejects_later_values() {
        let subject = Subject::new();
        let (seen, sink) = recorder();
        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        let _sub = subject.subscribe_with(sink, move || flag.set(true));

        subject.next(1);
        subject.complete();
        subject.next(2);

        assert!(completed.get());
        assert!(subject.is_closed());
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_subscribe_after_complete_gets_completion_immediately() {
        let subject: Subject<i32> = Subject::new();
        subject.complete();

        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        let sub = subject.subscribe_with(|_| {}, move || flag.set(true));

        assert!(completed.get());
        assert!(!sub.is_active());
    }

    #[test]
    fn test_reentrant_next_is_queued_in_order() {
        let subject = Subject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let feedback = subject.clone();
        let first = Rc::clone(&seen);
        let _a = subject.subscribe(move |v: &i32| {
            first.borrow_mut().push(("a", *v));
            if *v == 1 {
                feedback.next(2);
            }
        });
        let second = Rc::clone(&seen);
        let _b = subject.subscribe(move |v: &i32| second.borrow_mut().push(("b", *v)));

        subject.next(1);

        // Value 1 reaches every observer before value 2 starts.
        assert_eq!(
            *seen.borrow(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]
        );
    }
}

//! Latest-value replaying multicast.

use crate::subject::Subject;
use crate::subscription::Subscription;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A multicast source that remembers the last published value.
///
/// New subscribers receive the latest value synchronously during
/// [`Replay::subscribe`], followed by everything published afterwards.
/// The value is computed once by the publisher and shared by reference
/// with every observer.
pub struct Replay<T> {
    latest: Rc<RefCell<Option<T>>>,
    subject: Subject<T>,
}

impl<T: Clone + 'static> Replay<T> {
    /// Create an empty replay source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latest: Rc::new(RefCell::new(None)),
            subject: Subject::new(),
        }
    }

    /// Store `value` as the latest and deliver it to current observers.
    /// Ignored after completion.
    pub fn publish(&self, value: T) {
        if self.subject.is_closed() {
            return;
        }
        *self.latest.borrow_mut() = Some(value.clone());
        self.subject.next(value);
    }

    /// Complete the source. The latest value stays readable.
    pub fn complete(&self) {
        self.subject.complete();
    }

    /// The most recently published value, if any.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.latest.borrow().clone()
    }

    /// Whether the source has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.subject.is_closed()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    /// Replay the latest value to `on_next`, then keep it subscribed.
    ///
    /// The observer is registered before the replay, so values published
    /// from inside the replayed callback reach it too. When values are
    /// still queued behind an in-progress delivery the replay is skipped:
    /// the queue hands the new observer those values, ending with the
    /// latest.
    pub fn subscribe(&self, on_next: impl Fn(&T) + 'static) -> Subscription {
        let on_next: Rc<dyn Fn(&T)> = Rc::new(on_next);
        if self.is_settled() {
            self.replay_latest(on_next.as_ref());
            return Subscription::empty();
        }
        let forward = Rc::clone(&on_next);
        let subscription = self.subject.subscribe(move |value| forward(value));
        self.replay_latest(on_next.as_ref());
        subscription
    }

    /// Like [`Replay::subscribe`], with a completion callback. On a
    /// completed source the latest value is replayed before completion.
    pub fn subscribe_with(
        &self,
        on_next: impl Fn(&T) + 'static,
        on_complete: impl Fn() + 'static,
    ) -> Subscription {
        let on_next: Rc<dyn Fn(&T)> = Rc::new(on_next);
        if self.is_settled() {
            self.replay_latest(on_next.as_ref());
            return self.subject.subscribe_with(|_| {}, on_complete);
        }
        let forward = Rc::clone(&on_next);
        let subscription = self
            .subject
            .subscribe_with(move |value| forward(value), on_complete);
        self.replay_latest(on_next.as_ref());
        subscription
    }

    /// Completed with nothing left to deliver.
    fn is_settled(&self) -> bool {
        self.subject.is_closed() && !self.subject.has_pending()
    }

    fn replay_latest(&self, on_next: &dyn Fn(&T)) {
        if self.subject.has_pending() {
            return;
        }
        let latest = self.latest();
        if let Some(value) = latest {
            on_next(&value);
        }
    }
}

impl<T: Clone + 'static> Default for Replay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Replay<T> {
    fn clone(&self) -> Self {
        Self {
            latest: Rc::clone(&self.latest),
            subject: self.subject.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Replay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replay")
            .field("latest", &self.latest.borrow())
            .field("subject", &self.subject)
            .finish()
    }
}

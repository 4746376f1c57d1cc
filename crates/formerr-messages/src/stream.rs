//! Per-field message derivation.

use crate::equality::ErrorEquality;
use crate::resolver::MessageResolver;
use formerr_form::{ControlSource, ErrorSnapshot};
use formerr_reactive::{Replay, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Derives messages from one control's error snapshots.
struct Deriver {
    field: String,
    control: Rc<dyn ControlSource>,
    resolver: Rc<dyn MessageResolver>,
    equality: ErrorEquality,
    last: RefCell<Option<ErrorSnapshot>>,
    output: Replay<String>,
}

impl Deriver {
    fn process(&self) {
        // A valid control goes through the same path as an empty snapshot.
        let snapshot = self.control.errors().unwrap_or_default();

        {
            let mut last = self.last.borrow_mut();
            if let Some(prev) = last.as_ref() {
                if self.equality.equal(prev, &snapshot) {
                    trace!(field = %self.field, "errors unchanged, emission suppressed");
                    return;
                }
            }
            *last = Some(snapshot.clone());
        }

        let message = match snapshot.first() {
            Some((code, payload)) => self.resolver.get_message(&self.field, code, Some(payload)),
            None => String::new(),
        };
        trace!(field = %self.field, text = %message, "publishing message");
        self.output.publish(message);
    }
}

/// The current message of one field, shared by any number of subscribers.
///
/// Construction reads the control synchronously, so a value is available
/// before any status change happens. Each status notification re-reads the
/// control's errors; snapshots the [`ErrorEquality`] deems equal to the
/// previous one are dropped, others are resolved once and published to
/// every subscriber. When the control's notifications complete, so does
/// the stream.
///
/// Dropping the stream releases its subscription to the control.
pub struct ControlMessageStream {
    field: String,
    output: Replay<String>,
    _upstream: Subscription,
}

impl ControlMessageStream {
    /// Start deriving messages for `control`, reported as `field`.
    pub fn new(
        field: impl Into<String>,
        control: Rc<dyn ControlSource>,
        resolver: Rc<dyn MessageResolver>,
        equality: ErrorEquality,
    ) -> Self {
        let field = field.into();
        let output = Replay::new();
        let status_changes = control.status_changes();
        let deriver = Rc::new(Deriver {
            field: field.clone(),
            control,
            resolver,
            equality,
            last: RefCell::new(None),
            output: output.clone(),
        });

        // Seed before subscribing: a control that is already torn down
        // completes the stream right away, after its current message.
        deriver.process();

        let on_status = Rc::clone(&deriver);
        let on_complete = Rc::clone(&deriver);
        let upstream = status_changes.subscribe_with(
            move |_| on_status.process(),
            move || {
                trace!(field = %on_complete.field, "control completed, ending message stream");
                on_complete.output.complete();
            },
        );

        Self {
            field,
            output,
            _upstream: upstream,
        }
    }

    /// Field name the messages are resolved for.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Most recently published message; empty while the field is valid.
    #[must_use]
    pub fn latest(&self) -> String {
        self.output.latest().unwrap_or_default()
    }

    /// Receive the latest message immediately and every later one.
    pub fn subscribe(&self, on_message: impl Fn(&String) + 'static) -> Subscription {
        self.output.subscribe(on_message)
    }

    /// Like [`ControlMessageStream::subscribe`], with a callback for when
    /// the control is torn down.
    pub fn subscribe_with(
        &self,
        on_message: impl Fn(&String) + 'static,
        on_complete: impl Fn() + 'static,
    ) -> Subscription {
        self.output.subscribe_with(on_message, on_complete)
    }

    /// Whether the upstream control has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.output.is_complete()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.output.observer_count()
    }
}

impl fmt::Debug for ControlMessageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlMessageStream")
            .field("field", &self.field)
            .field("latest", &self.output.latest())
            .field("complete", &self.is_complete())
            .finish()
    }
}

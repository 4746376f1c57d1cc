//! Pull-style view of a message stream.

use crate::stream::ControlMessageStream;
use formerr_reactive::{Observable, Subscription};

/// Readable current message of one field.
///
/// Follows its stream for as long as the scope it was built in is alive,
/// then keeps the last value it saw.
#[derive(Debug, Clone)]
pub struct MessageCell {
    value: Observable<String>,
}

impl MessageCell {
    /// Build a cell seeded with the stream's latest message. The returned
    /// subscription keeps the cell updating; whoever owns the scope owns it.
    pub(crate) fn follow(stream: &ControlMessageStream) -> (Self, Subscription) {
        let value = Observable::new(stream.latest());
        let sink = value.clone();
        let subscription = stream.subscribe(move |message| sink.set(message.clone()));
        (Self { value }, subscription)
    }

    /// Current message; empty while the field is valid.
    #[must_use]
    pub fn get(&self) -> String {
        self.value.get()
    }

    /// Whether the field currently has an error message.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.value.with(|message| !message.is_empty())
    }

    /// Number of times the message text changed.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.value.version()
    }

    /// Called with the new text whenever it changes.
    pub fn subscribe(&self, callback: impl Fn(&String) + 'static) -> Subscription {
        self.value.subscribe(callback)
    }
}

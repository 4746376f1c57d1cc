#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # formerr-reactive
//!
//! Single-threaded push primitives used to move validation state through
//! the message pipeline:
//!
//! - [`Subject`]: multicast event source with completion.
//! - [`Replay`]: a [`Subject`] that remembers its latest value and hands it
//!   to every new subscriber immediately.
//! - [`Observable`]: a version-tracked value cell with change callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Scope`]: owner of subscriptions and derived state; dropping it
//!   releases everything it holds.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. A notification raised while another one is being delivered is queued
//!    and delivered after it, so every observer sees events in source order.
//! 3. Nothing is delivered after completion.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod observable;
pub mod replay;
pub mod scope;
pub mod subject;
pub mod subscription;

pub use observable::Observable;
pub use replay::Replay;
pub use scope::Scope;
pub use subject::Subject;
pub use subscription::Subscription;

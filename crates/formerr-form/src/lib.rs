#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # formerr-form
//!
//! Form controls and groups that publish validation state.
//!
//! Each [`FormControl`] holds a JSON value and a list of [`Validator`]s.
//! Whenever its value or validity changes it recomputes an
//! [`ErrorSnapshot`] and announces the new [`ControlStatus`] on a
//! [`Subject`](formerr_reactive::Subject). Consumers read controls through
//! the [`ControlSource`] and [`GroupSource`] traits.
//!
//! ## Example Usage
//!
//! ```rust
//! use formerr_form::{ControlSource, FormControl, Validator};
//! use serde_json::json;
//!
//! let email = FormControl::with_validators(json!(""), vec![Validator::Required]);
//! assert!(email.errors().is_some());
//!
//! email.set_value(json!("someone@example.com"));
//! assert!(email.errors().is_none());
//! ```

pub mod control;
pub mod definition;
pub mod group;
pub mod snapshot;
pub mod validators;

pub use control::{ControlSource, ControlStatus, FormControl};
pub use definition::{FieldDefinition, FormDefinition, ValidatorSpec};
pub use group::{FormGroup, GroupSource};
pub use snapshot::ErrorSnapshot;
pub use validators::{CustomCheck, Validator};

use thiserror::Error;

/// Errors that can occur while building forms
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an invalid-pattern error from the rejected source and reason.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

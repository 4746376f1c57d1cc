#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # formerr-messages
//!
//! Reactive, per-field error messages for forms.
//!
//! A [`ControlMessageStream`] watches one control and publishes the message
//! for its first error, or an empty string while it is valid. A
//! [`FormMessageMap`] builds one stream per field of a form. Message text
//! comes from a [`MessageResolver`]; the default one ships built-in
//! messages for the common codes and accepts overrides.
//!
//! ## Example Usage
//!
//! ```rust
//! use formerr_form::{FormControl, FormGroup, Validator};
//! use formerr_messages::FormMessageMap;
//! use formerr_reactive::Scope;
//! use serde_json::json;
//!
//! let email = FormControl::with_validators(json!(""), vec![Validator::Required]);
//! let form = FormGroup::new().with_control("email", email.clone());
//!
//! let scope = Scope::new();
//! let messages = FormMessageMap::default().cells(&form, &scope);
//! assert_eq!(messages["email"].get(), "Email is required.");
//!
//! email.set_value(json!("someone@example.com"));
//! assert_eq!(messages["email"].get(), "");
//! ```

pub mod catalog;
pub mod cell;
pub mod config;
pub mod equality;
pub mod map;
pub mod resolver;
pub mod stream;
mod template;

pub use catalog::MessageCatalog;
pub use cell::MessageCell;
pub use config::ReactiveErrorConfig;
pub use equality::ErrorEquality;
pub use map::FormMessageMap;
pub use resolver::{
    DefaultMessageResolver, MessageFn, MessageResolver, fallback_message, format_field_name,
    message_fn,
};
pub use stream::ControlMessageStream;

use thiserror::Error;

/// Errors that can occur while configuring messages
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid template for '{code}': {message}")]
    Template { code: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a template error for the message registered under `code`.
    pub fn template(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

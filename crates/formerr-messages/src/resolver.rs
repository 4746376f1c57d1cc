//! Message resolution
//!
//! Maps `(field, error code, payload)` to display text. The
//! [`MessageResolver`] trait is the seam applications replace; the
//! [`DefaultMessageResolver`] keeps a registry of per-code formatters.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Formatter for one error code: `(field name, payload) -> message`.
///
/// The field name is passed raw; formatters that want the display form
/// call [`format_field_name`].
pub type MessageFn = Rc<dyn Fn(&str, Option<&Value>) -> String>;

/// Wrap a closure as a [`MessageFn`].
pub fn message_fn(f: impl Fn(&str, Option<&Value>) -> String + 'static) -> MessageFn {
    Rc::new(f)
}

/// Strategy turning validation errors into display text.
///
/// Implementations must always return a string; codes they know nothing
/// about should degrade to a generic message rather than fail.
pub trait MessageResolver {
    /// Message for `code` reported on `field`.
    fn get_message(&self, field: &str, code: &str, payload: Option<&Value>) -> String;

    /// Add or replace formatters. Later entries for the same code win.
    fn register_messages(&self, entries: Vec<(String, MessageFn)>);
}

/// Display form of a field name: a space before every internal capital
/// letter, and the first character upper-cased.
///
/// ```rust
/// use formerr_messages::format_field_name;
///
/// assert_eq!(format_field_name("userName"), "User Name");
/// assert_eq!(format_field_name("email"), "Email");
/// ```
#[must_use]
pub fn format_field_name(field: &str) -> String {
    let mut formatted = String::with_capacity(field.len() + 4);
    for (idx, ch) in field.chars().enumerate() {
        if idx == 0 {
            formatted.extend(ch.to_uppercase());
            continue;
        }
        if ch.is_ascii_uppercase() {
            formatted.push(' ');
        }
        formatted.push(ch);
    }
    formatted
}

/// Message used when no formatter is registered for a code.
#[must_use]
pub fn fallback_message(field: &str) -> String {
    format!("{} is invalid.", format_field_name(field))
}

/// Render a payload value for display: strings unquoted, whole floats
/// without a trailing `.0`, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            #[allow(clippy::cast_possible_truncation)]
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn payload_number(payload: Option<&Value>, key: &str) -> Option<String> {
    let number = payload?.get(key)?;
    number.is_number().then(|| display_value(number))
}

fn builtin_messages() -> Vec<(String, MessageFn)> {
    vec![
        (
            "required".to_string(),
            message_fn(|field, _| format!("{} is required.", format_field_name(field))),
        ),
        (
            "minlength".to_string(),
            message_fn(|field, payload| match payload_number(payload, "requiredLength") {
                Some(n) => format!(
                    "{} must be at least {n} characters.",
                    format_field_name(field)
                ),
                None => fallback_message(field),
            }),
        ),
        (
            "maxlength".to_string(),
            message_fn(|field, payload| match payload_number(payload, "requiredLength") {
                Some(n) => format!("{} cannot exceed {n} characters.", format_field_name(field)),
                None => fallback_message(field),
            }),
        ),
        (
            "pattern".to_string(),
            message_fn(|field, _| {
                format!(
                    "{} does not match the required pattern.",
                    format_field_name(field)
                )
            }),
        ),
        (
            "min".to_string(),
            message_fn(|field, payload| match payload_number(payload, "min") {
                Some(n) => format!("{} must be at least {n}.", format_field_name(field)),
                None => fallback_message(field),
            }),
        ),
        (
            "max".to_string(),
            message_fn(|field, payload| match payload_number(payload, "max") {
                Some(n) => format!("{} cannot exceed {n}.", format_field_name(field)),
                None => fallback_message(field),
            }),
        ),
    ]
}

/// Registry-backed resolver seeded with built-in messages for `required`,
/// `minlength`, `maxlength`, `pattern`, `min` and `max`.
pub struct DefaultMessageResolver {
    lookup: RefCell<HashMap<String, MessageFn>>,
}

impl DefaultMessageResolver {
    /// Resolver with the built-in messages only.
    #[must_use]
    pub fn new() -> Self {
        let resolver = Self {
            lookup: RefCell::new(HashMap::new()),
        };
        resolver.register_messages(builtin_messages());
        resolver
    }

    /// Resolver with the built-ins, then `entries` applied on top.
    #[must_use]
    pub fn with_messages(entries: Vec<(String, MessageFn)>) -> Self {
        let resolver = Self::new();
        resolver.register_messages(entries);
        resolver
    }

    /// Whether a formatter is registered for `code`.
    #[must_use]
    pub fn has_message(&self, code: &str) -> bool {
        self.lookup.borrow().contains_key(code)
    }

    /// Registered codes, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.lookup.borrow().keys().cloned().collect();
        codes.sort();
        codes
    }
}

impl Default for DefaultMessageResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageResolver for DefaultMessageResolver {
    fn get_message(&self, field: &str, code: &str, payload: Option<&Value>) -> String {
        // Release the registry before calling out so formatters may resolve
        // or register themselves.
        let formatter = self.lookup.borrow().get(code).cloned();
        match formatter {
            Some(format) => format(field, payload),
            None => {
                debug!(field, code, "no message registered, using fallback");
                fallback_message(field)
            }
        }
    }

    fn register_messages(&self, entries: Vec<(String, MessageFn)>) {
        let mut lookup = self.lookup.borrow_mut();
        for (code, format) in entries {
            lookup.insert(code, format);
        }
    }
}

impl fmt::Debug for DefaultMessageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMessageResolver")
            .field("codes", &self.codes())
            .finish()
    }
}

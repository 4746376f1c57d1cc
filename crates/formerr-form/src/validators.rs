//! Validation rules
//!
//! Each rule inspects a control value and, when it fails, returns the
//! payload stored under its error code in the control's
//! [`ErrorSnapshot`]. Empty values pass every rule except
//! [`Validator::Required`], so optional fields only get checked once
//! something was entered.

use crate::snapshot::ErrorSnapshot;
use regex::Regex;
use serde_json::{Value, json};
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

// An uncompilable pattern rejects every address.
static EMAIL_REGEX: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN));

/// Check for [`Validator::Custom`]: returns the error payload when the
/// value is invalid.
pub type CustomCheck = Rc<dyn Fn(&Value) -> Option<Value>>;

/// A validation rule attached to a control
#[derive(Clone)]
pub enum Validator {
    /// Value must be present and non-empty. Code `required`.
    Required,
    /// String or array length lower bound. Code `minlength`.
    MinLength(usize),
    /// String or array length upper bound. Code `maxlength`.
    MaxLength(usize),
    /// Full-match regex. Code `pattern`.
    Pattern(Regex),
    /// Email address shape. Code `email`.
    Email,
    /// Numeric lower bound. Code `min`.
    Min(f64),
    /// Numeric upper bound. Code `max`.
    Max(f64),
    /// Application-defined rule reporting under `code`.
    Custom { code: String, check: CustomCheck },
}

impl Validator {
    /// Build a pattern rule. The pattern must match the whole value, so it
    /// is anchored unless it already starts with `^` and ends with `$`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] if the regex does not compile.
    pub fn pattern(pattern: &str) -> crate::Result<Self> {
        let anchored = if pattern.starts_with('^') && pattern.ends_with('$') {
            pattern.to_string()
        } else {
            format!("^(?:{pattern})$")
        };
        Regex::new(&anchored)
            .map(Validator::Pattern)
            .map_err(|e| crate::Error::invalid_pattern(pattern, e.to_string()))
    }

    /// Build a custom rule.
    pub fn custom(
        code: impl Into<String>,
        check: impl Fn(&Value) -> Option<Value> + 'static,
    ) -> Self {
        Validator::Custom {
            code: code.into(),
            check: Rc::new(check),
        }
    }

    /// Error code this rule reports under.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Validator::Required => "required",
            Validator::MinLength(_) => "minlength",
            Validator::MaxLength(_) => "maxlength",
            Validator::Pattern(_) => "pattern",
            Validator::Email => "email",
            Validator::Min(_) => "min",
            Validator::Max(_) => "max",
            Validator::Custom { code, .. } => code,
        }
    }

    /// Run the rule; `Some(payload)` when the value fails it.
    #[must_use]
    pub fn check(&self, value: &Value) -> Option<Value> {
        match self {
            Validator::Required => validate_required(value),
            Validator::MinLength(min) => validate_min_length(value, *min),
            Validator::MaxLength(max) => validate_max_length(value, *max),
            Validator::Pattern(regex) => validate_pattern(value, regex),
            Validator::Email => validate_email(value),
            Validator::Min(min) => validate_min(value, *min),
            Validator::Max(max) => validate_max(value, *max),
            Validator::Custom { check, .. } => check(value),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Required => f.write_str("Required"),
            Validator::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Validator::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Validator::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Validator::Email => f.write_str("Email"),
            Validator::Min(n) => f.debug_tuple("Min").field(n).finish(),
            Validator::Max(n) => f.debug_tuple("Max").field(n).finish(),
            Validator::Custom { code, .. } => f.debug_struct("Custom").field("code", code).finish(),
        }
    }
}

/// Run every rule in order and collect the failures.
///
/// Returns `None` when the value passes all rules.
#[must_use]
pub fn run_validators(validators: &[Validator], value: &Value) -> Option<ErrorSnapshot> {
    validators
        .iter()
        .filter_map(|validator| {
            validator
                .check(value)
                .map(|payload| (validator.code().to_string(), payload))
        })
        .collect::<ErrorSnapshot>()
        .into_option()
}

/// `null`, empty strings and empty arrays count as "nothing entered".
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Validate required value
#[must_use]
pub fn validate_required(value: &Value) -> Option<Value> {
    is_empty_value(value).then(|| Value::Bool(true))
}

/// Validate minimum length
#[must_use]
pub fn validate_min_length(value: &Value, min: usize) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    let actual = value_length(value)?;
    (actual < min).then(|| json!({ "requiredLength": min, "actualLength": actual }))
}

/// Validate maximum length
#[must_use]
pub fn validate_max_length(value: &Value, max: usize) -> Option<Value> {
    let actual = value_length(value)?;
    (actual > max).then(|| json!({ "requiredLength": max, "actualLength": actual }))
}

/// Validate pattern matching
#[must_use]
pub fn validate_pattern(value: &Value, regex: &Regex) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    let text = value_as_text(value)?;
    (!regex.is_match(&text))
        .then(|| json!({ "requiredPattern": regex.as_str(), "actualValue": text }))
}

/// Validate email address shape
#[must_use]
pub fn validate_email(value: &Value) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    match value {
        Value::String(s) if EMAIL_REGEX.as_ref().is_ok_and(|re| re.is_match(s)) => None,
        _ => Some(Value::Bool(true)),
    }
}

/// Validate numeric lower bound
#[must_use]
pub fn validate_min(value: &Value, min: f64) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    let actual = value_as_number(value)?;
    (actual < min).then(|| json!({ "min": min, "actual": actual }))
}

/// Validate numeric upper bound
#[must_use]
pub fn validate_max(value: &Value, max: f64) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    let actual = value_as_number(value)?;
    (actual > max).then(|| json!({ "max": max, "actual": actual }))
}

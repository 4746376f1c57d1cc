//! Point-in-time validation error sets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The failing validation codes of one control, with their payloads.
///
/// Codes keep insertion order, which is the order validators ran in. The
/// first code is the one surfaced to users. Payloads are opaque JSON:
/// `true`, an object with details, or `null` when there is nothing to say.
///
/// `PartialEq` compares as a set of codes; use the message crate's
/// equality strategies when order matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSnapshot {
    errors: Map<String, Value>,
}

impl ErrorSnapshot {
    /// Empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add of one code. Re-adding a code replaces its payload
    /// but keeps its position.
    #[must_use]
    pub fn with(mut self, code: impl Into<String>, payload: Value) -> Self {
        self.errors.insert(code.into(), payload);
        self
    }

    /// First code and payload in enumeration order.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.errors.iter().next().map(|(code, payload)| (code.as_str(), payload))
    }

    /// Payload for `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.errors.get(code)
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.errors.contains_key(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Codes in enumeration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// `(code, payload)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.errors.iter().map(|(code, payload)| (code.as_str(), payload))
    }

    /// `None` for an empty snapshot, the snapshot otherwise.
    #[must_use]
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl From<Map<String, Value>> for ErrorSnapshot {
    fn from(errors: Map<String, Value>) -> Self {
        Self { errors }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ErrorSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            errors: iter
                .into_iter()
                .map(|(code, payload)| (code.into(), payload))
                .collect(),
        }
    }
}

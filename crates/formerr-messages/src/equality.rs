//! Snapshot equality used to throttle message emissions.

use formerr_form::ErrorSnapshot;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// How two consecutive error snapshots are compared.
///
/// Equal snapshots never produce a second emission. Whatever the strategy,
/// two empty snapshots are equal and snapshots with a different number of
/// codes are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorEquality {
    /// Same codes in the same order with deep-equal payloads. Any payload
    /// change re-emits, even when the resulting text is identical.
    #[default]
    Strict,
    /// Single-code snapshots are equal when the code matches, whatever the
    /// payloads. Multi-code snapshots are compared as [`Strict`](Self::Strict).
    ShallowKey,
}

impl ErrorEquality {
    /// Whether `prev` and `curr` count as the same state.
    #[must_use]
    pub fn equal(self, prev: &ErrorSnapshot, curr: &ErrorSnapshot) -> bool {
        if prev.len() != curr.len() {
            return false;
        }
        match self {
            ErrorEquality::Strict => strict_equal(prev, curr),
            ErrorEquality::ShallowKey => {
                if prev.len() == 1 {
                    prev.first().map(|(code, _)| code) == curr.first().map(|(code, _)| code)
                } else {
                    strict_equal(prev, curr)
                }
            }
        }
    }
}

// Order matters at the top level: the first code decides the message.
fn strict_equal(prev: &ErrorSnapshot, curr: &ErrorSnapshot) -> bool {
    prev.len() == curr.len()
        && prev
            .iter()
            .zip(curr.iter())
            .all(|((a_code, a_payload), (b_code, b_payload))| {
                a_code == b_code && a_payload == b_payload
            })
}

impl fmt::Display for ErrorEquality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorEquality::Strict => f.write_str("strict"),
            ErrorEquality::ShallowKey => f.write_str("shallow_key"),
        }
    }
}

impl FromStr for ErrorEquality {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(ErrorEquality::Strict),
            "shallow_key" => Ok(ErrorEquality::ShallowKey),
            other => Err(crate::Error::InvalidFormat(format!(
                "unknown equality strategy '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minlength(actual: u64) -> ErrorSnapshot {
        ErrorSnapshot::new().with("minlength", json!({"requiredLength": 3, "actualLength": actual}))
    }

    #[test]
    fn test_empty_snapshots_are_equal() {
        let empty = ErrorSnapshot::new();
        assert!(ErrorEquality::Strict.equal(&empty, &empty));
        assert!(ErrorEquality::ShallowKey.equal(&empty, &empty));
    }

    #[test]
    fn test_different_counts_never_equal() {
        let one = ErrorSnapshot::new().with("required", json!(true));
        let two = one.clone().with("pattern", json!(true));
        assert!(!ErrorEquality::Strict.equal(&one, &two));
        assert!(!ErrorEquality::ShallowKey.equal(&one, &two));
        assert!(!ErrorEquality::ShallowKey.equal(&ErrorSnapshot::new(), &one));
    }

    #[test]
    fn test_payload_change_on_single_code() {
        assert!(!ErrorEquality::Strict.equal(&minlength(1), &minlength(2)));
        assert!(ErrorEquality::ShallowKey.equal(&minlength(1), &minlength(2)));
    }

    #[test]
    fn test_single_code_change() {
        let required = ErrorSnapshot::new().with("required", json!(true));
        let email = ErrorSnapshot::new().with("email", json!(true));
        assert!(!ErrorEquality::Strict.equal(&required, &email));
        assert!(!ErrorEquality::ShallowKey.equal(&required, &email));
    }

    #[test]
    fn test_order_is_significant() {
        let a = ErrorSnapshot::new()
            .with("required", json!(true))
            .with("pattern", json!(true));
        let b = ErrorSnapshot::new()
            .with("pattern", json!(true))
            .with("required", json!(true));
        assert!(!ErrorEquality::Strict.equal(&a, &b));
        assert!(!ErrorEquality::ShallowKey.equal(&a, &b));
        assert!(ErrorEquality::Strict.equal(&a, &a.clone()));
    }

    #[test]
    fn test_multi_code_shallow_falls_back_to_strict() {
        let a = ErrorSnapshot::new()
            .with("minlength", json!({"actualLength": 1}))
            .with("pattern", json!(true));
        let b = ErrorSnapshot::new()
            .with("minlength", json!({"actualLength": 2}))
            .with("pattern", json!(true));
        assert!(!ErrorEquality::ShallowKey.equal(&a, &b));
    }

    #[test]
    fn test_parse_and_deserialize() {
        assert_eq!("strict".parse::<ErrorEquality>().unwrap(), ErrorEquality::Strict);
        assert_eq!(
            "shallow-key".parse::<ErrorEquality>().unwrap(),
            ErrorEquality::ShallowKey
        );
        assert!("loose".parse::<ErrorEquality>().is_err());

        let parsed: ErrorEquality = serde_json::from_str(r#""shallow_key""#).unwrap();
        assert_eq!(parsed, ErrorEquality::ShallowKey);
        assert_eq!(ErrorEquality::default(), ErrorEquality::Strict);
    }
}

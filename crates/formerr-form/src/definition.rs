//! Form definitions loaded from YAML or JSON
//!
//! ```yaml
//! fields:
//!   - name: email
//!     validators: [required, email]
//!   - name: userName
//!     value: ""
//!     validators:
//!       - required
//!       - minlength: 3
//!       - pattern: "[a-zA-Z]+"
//! ```

use crate::control::FormControl;
use crate::group::FormGroup;
use crate::validators::Validator;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Declarative validator
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorSpec {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    Min(f64),
    Max(f64),
}

impl ValidatorSpec {
    /// Turn the declaration into a runnable rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for a pattern that does not compile.
    pub fn build(&self) -> Result<Validator> {
        Ok(match self {
            ValidatorSpec::Required => Validator::Required,
            ValidatorSpec::Email => Validator::Email,
            ValidatorSpec::MinLength(n) => Validator::MinLength(*n),
            ValidatorSpec::MaxLength(n) => Validator::MaxLength(*n),
            ValidatorSpec::Pattern(pattern) => Validator::pattern(pattern)?,
            ValidatorSpec::Min(n) => Validator::Min(*n),
            ValidatorSpec::Max(n) => Validator::Max(*n),
        })
    }
}

/// One field of a form definition
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub validators: Vec<ValidatorSpec>,
    #[serde(default)]
    pub disabled: bool,
}

/// A form: ordered field definitions
#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    /// Load from a file, choosing the parser by extension (`.yaml`/`.yml`
    /// for YAML, anything else as JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading form definition");

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse a YAML definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on malformed input.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))
    }

    /// Parse a JSON definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))
    }

    /// Build a live form group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for duplicate field names and
    /// [`Error::InvalidPattern`] for patterns that do not compile.
    pub fn build(&self) -> Result<FormGroup> {
        let group = FormGroup::new();
        for field in &self.fields {
            if group.contains(&field.name) {
                return Err(Error::InvalidFormat(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
            let validators = field
                .validators
                .iter()
                .map(ValidatorSpec::build)
                .collect::<Result<Vec<_>>>()?;
            let control = FormControl::with_validators(field.value.clone(), validators);
            if field.disabled {
                control.disable();
            }
            group.add_control(field.name.clone(), control);
        }
        info!(fields = group.len(), "built form group");
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlSource;
    use serde_json::json;

    const FORM_YAML: &str = r#"
fields:
  - name: email
    validators: [required, email]
  - name: userName
    value: "al"
    validators:
      - required
      - minlength: 3
      - pattern: "[a-z]+"
  - name: age
    disabled: true
    validators:
      - min: 18
"#;

    #[test]
    fn test_parse_yaml_definition() {
        let def = FormDefinition::from_yaml(FORM_YAML).unwrap();
        assert_eq!(def.fields.len(), 3);
        assert_eq!(
            def.fields[1].validators,
            vec![
                ValidatorSpec::Required,
                ValidatorSpec::MinLength(3),
                ValidatorSpec::Pattern("[a-z]+".to_string()),
            ]
        );
        assert_eq!(def.fields[2].validators, vec![ValidatorSpec::Min(18.0)]);
    }

    #[test]
    fn test_build_group() {
        let group = FormDefinition::from_yaml(FORM_YAML).unwrap().build().unwrap();
        let user = group.get("userName").unwrap();
        assert_eq!(user.value(), json!("al"));
        assert!(user.errors().unwrap().contains("minlength"));
        assert!(group.get("age").unwrap().is_disabled());
    }

    #[test]
    fn test_parse_json_definition() {
        let def = FormDefinition::from_json(
            r#"{"fields": [{"name": "code", "validators": ["required", {"maxlength": 4}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            def.fields[0].validators,
            vec![ValidatorSpec::Required, ValidatorSpec::MaxLength(4)]
        );
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let def = FormDefinition::from_yaml("fields: [{name: a}, {name: a}]").unwrap();
        assert!(matches!(def.build(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let def = FormDefinition::from_yaml("fields: [{name: a, validators: [{pattern: '[a-'}]}]")
            .unwrap();
        assert!(matches!(def.build(), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            FormDefinition::from_yaml("fields: 3"),
            Err(Error::InvalidFormat(_))
        ));
    }
}

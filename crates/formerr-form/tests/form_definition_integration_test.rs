//! Integration test: loading form definitions from disk and driving them

use formerr_form::{ControlSource, ControlStatus, FormDefinition, GroupSource};
use serde_json::json;
use std::io::Write;

const SIGNUP_YAML: &str = r#"
fields:
  - name: email
    validators: [required, email]
  - name: userName
    validators:
      - required
      - minlength: 3
      - maxlength: 12
  - name: age
    value: 30
    validators:
      - min: 18
      - max: 120
"#;

fn write_temp(suffix: &str, content: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_yaml_file() -> anyhow::Result<()> {
    let file = write_temp(".yaml", SIGNUP_YAML)?;
    let form = FormDefinition::from_file(file.path())?.build()?;

    assert_eq!(form.control_names(), vec!["email", "userName", "age"]);
    assert!(!form.is_valid());

    let email = form.get("email").expect("email control");
    assert_eq!(email.status(), ControlStatus::Invalid);
    assert!(form.get("age").expect("age control").is_valid());
    Ok(())
}

#[test]
fn test_load_json_file() -> anyhow::Result<()> {
    let file = write_temp(
        ".json",
        r#"{"fields": [{"name": "code", "value": "ABCDE", "validators": [{"maxlength": 4}]}]}"#,
    )?;
    let form = FormDefinition::from_file(file.path())?.build()?;
    let errors = form.get("code").expect("code control").errors().expect("errors");
    assert_eq!(
        errors.get("maxlength"),
        Some(&json!({"requiredLength": 4, "actualLength": 5}))
    );
    Ok(())
}

#[test]
fn test_filling_in_the_form() -> anyhow::Result<()> {
    let form = FormDefinition::from_yaml(SIGNUP_YAML)?.build()?;

    form.patch_value(&json!({"email": "someone@example.com", "userName": "alice"}))?;
    assert!(form.is_valid());

    form.patch_value(&json!({"age": 150}))?;
    let age_errors = form.get("age").expect("age control").errors().expect("errors");
    assert_eq!(age_errors.first().map(|(code, _)| code), Some("max"));
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let err = FormDefinition::from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, formerr_form::Error::Io(_)));
}

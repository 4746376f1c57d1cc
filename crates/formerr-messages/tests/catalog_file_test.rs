//! Integration test: message catalogs loaded from disk

use formerr_form::{FormControl, FormGroup, Validator};
use formerr_messages::{ErrorEquality, FormMessageMap, MessageCatalog, ReactiveErrorConfig};
use formerr_reactive::Scope;
use serde_json::json;
use std::io::Write;

fn write_temp(suffix: &str, content: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

fn signup_form() -> FormGroup {
    FormGroup::new()
        .with_control(
            "userName",
            FormControl::with_validators(json!("al"), vec![Validator::Required, Validator::MinLength(3)]),
        )
        .with_control(
            "email",
            FormControl::with_validators(json!(""), vec![Validator::Required]),
        )
}

#[test]
fn test_yaml_catalog_overrides_builtins() -> anyhow::Result<()> {
    let file = write_temp(
        ".yaml",
        "equality: shallow_key\nmessages:\n  minlength: \"{field} needs {requiredLength}+ characters ({name})\"\n",
    )?;
    let catalog = MessageCatalog::from_file(file.path())?;
    assert_eq!(catalog.equality(), Some(ErrorEquality::ShallowKey));

    let map = FormMessageMap::from_config(ReactiveErrorConfig::new().with_catalog(&catalog));
    assert_eq!(map.equality(), ErrorEquality::ShallowKey);

    let form = signup_form();
    let scope = Scope::new();
    let cells = map.cells(&form, &scope);

    assert_eq!(
        cells["userName"].get(),
        "User Name needs 3+ characters (userName)"
    );
    // Codes the catalog leaves out keep their built-in message.
    assert_eq!(cells["email"].get(), "Email is required.");
    Ok(())
}

#[test]
fn test_json_catalog_value_placeholder() -> anyhow::Result<()> {
    let file = write_temp(
        ".json",
        r#"{"messages": {"required": "{{{field}}} missing: {value}"}}"#,
    )?;
    let catalog = MessageCatalog::from_file(file.path())?;
    assert_eq!(catalog.codes().collect::<Vec<_>>(), vec!["required"]);

    let map = FormMessageMap::from_config(ReactiveErrorConfig::new().with_catalog(&catalog));
    let form = signup_form();
    let scope = Scope::new();
    let cells = map.cells(&form, &scope);

    assert_eq!(cells["email"].get(), "{Email} missing: true");
    Ok(())
}

#[test]
fn test_unknown_top_level_key_is_rejected() -> anyhow::Result<()> {
    let file = write_temp(".yaml", "messages: {}\nlocale: en\n")?;
    let err = MessageCatalog::from_file(file.path()).unwrap_err();
    assert!(matches!(err, formerr_messages::Error::InvalidFormat(_)));
    Ok(())
}

#[test]
fn test_missing_catalog_is_io_error() {
    let err = MessageCatalog::from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, formerr_messages::Error::Io(_)));
}

//! Message templates
//!
//! `{field}` is the display form of the field name, `{name}` the raw name,
//! `{value}` the whole payload, and any other `{key}` the payload's
//! top-level entry of that name (empty when absent). `{{` and `}}` produce
//! literal braces.

use crate::resolver::{display_value, format_field_name};
use crate::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field,
    Name,
    Value,
    Key(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, the template registered under `code`.
    pub(crate) fn parse(code: &str, source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(Error::template(code, "unclosed placeholder"));
                    }
                    let name = name.trim();
                    if name.is_empty()
                        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    {
                        return Err(Error::template(
                            code,
                            format!("invalid placeholder '{{{name}}}'"),
                        ));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(match name {
                        "field" => Segment::Field,
                        "name" => Segment::Name,
                        "value" => Segment::Value,
                        key => Segment::Key(key.to_string()),
                    });
                }
                '}' => return Err(Error::template(code, "unmatched '}'")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub(crate) fn render(&self, field: &str, payload: Option<&Value>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field => out.push_str(&format_field_name(field)),
                Segment::Name => out.push_str(field),
                Segment::Value => {
                    if let Some(payload) = payload {
                        out.push_str(&display_value(payload));
                    }
                }
                Segment::Key(key) => {
                    if let Some(value) = payload.and_then(|p| p.get(key)) {
                        out.push_str(&display_value(value));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_placeholders() {
        let template =
            Template::parse("minlength", "{field} ({name}) needs {requiredLength}+ chars").unwrap();
        assert_eq!(
            template.render("userName", Some(&json!({"requiredLength": 3}))),
            "User Name (userName) needs 3+ chars"
        );
    }

    #[test]
    fn test_value_and_missing_key() {
        let template = Template::parse("x", "[{value}|{missing}]").unwrap();
        assert_eq!(template.render("f", Some(&json!("abc"))), "[abc|]");
        assert_eq!(template.render("f", None), "[|]");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("x", "{{literal}} {field}").unwrap();
        assert_eq!(template.render("a", None), "{literal} A");
    }

    #[test]
    fn test_rejects_malformed_templates() {
        assert!(matches!(
            Template::parse("x", "{field"),
            Err(Error::Template { .. })
        ));
        assert!(matches!(Template::parse("x", "oops}"), Err(Error::Template { .. })));
        assert!(matches!(Template::parse("x", "{}"), Err(Error::Template { .. })));
        assert!(matches!(
            Template::parse("x", "{not valid}"),
            Err(Error::Template { .. })
        ));
    }
}

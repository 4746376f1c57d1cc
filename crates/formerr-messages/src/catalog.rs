//! Message catalogs loaded from YAML or JSON
//!
//! ```yaml
//! equality: shallow_key
//! messages:
//!   required: "{field} is mandatory"
//!   minlength: "{field} needs {requiredLength}+ characters"
//! ```

use crate::equality::ErrorEquality;
use crate::resolver::{MessageFn, message_fn};
use crate::template::Template;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

/// Serializable catalog format
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    equality: Option<ErrorEquality>,
    #[serde(default)]
    messages: BTreeMap<String, String>,
}

/// Code-to-template messages plus an optional equality strategy.
///
/// Templates are checked when the catalog is built, so a loaded catalog
/// always renders.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    equality: Option<ErrorEquality>,
    templates: Vec<(String, Rc<Template>)>,
}

impl MessageCatalog {
    /// Build from `(code, template)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] for the first malformed template.
    pub fn from_templates<I, C, T>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, T)>,
        C: Into<String>,
        T: AsRef<str>,
    {
        let templates = templates
            .into_iter()
            .map(|(code, source)| {
                let code = code.into();
                let template = Template::parse(&code, source.as_ref())?;
                Ok((code, Rc::new(template)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            equality: None,
            templates,
        })
    }

    /// Load from a file, choosing the parser by extension (`.yaml`/`.yml`
    /// for YAML, anything else as JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or contains a
    /// malformed template.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading message catalog");

        let catalog = if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };
        info!(
            path = %path.display(),
            messages = catalog.len(),
            "loaded message catalog"
        );
        Ok(catalog)
    }

    /// Parse a YAML catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on malformed input and
    /// [`Error::Template`] on a malformed template.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;
        Self::from_catalog_file(file)
    }

    /// Parse a JSON catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on malformed input and
    /// [`Error::Template`] on a malformed template.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;
        Self::from_catalog_file(file)
    }

    fn from_catalog_file(file: CatalogFile) -> Result<Self> {
        let mut catalog = Self::from_templates(file.messages)?;
        catalog.equality = file.equality;
        Ok(catalog)
    }

    /// Equality strategy named by the catalog, if any.
    #[must_use]
    pub fn equality(&self) -> Option<ErrorEquality> {
        self.equality
    }

    /// Codes with a template.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|(code, _)| code.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Formatters ready for [`MessageResolver::register_messages`](crate::MessageResolver::register_messages).
    #[must_use]
    pub fn entries(&self) -> Vec<(String, MessageFn)> {
        self.templates
            .iter()
            .map(|(code, template)| {
                let template = Rc::clone(template);
                (
                    code.clone(),
                    message_fn(move |field, payload| template.render(field, payload)),
                )
            })
            .collect()
    }
}

//! Setup-time configuration

use crate::catalog::MessageCatalog;
use crate::equality::ErrorEquality;
use crate::resolver::{DefaultMessageResolver, MessageFn, MessageResolver, message_fn};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Everything needed to set up message resolution for a form scope.
///
/// Extra messages are registered on top of the resolver's own, whether that
/// is the default resolver or one supplied through
/// [`ReactiveErrorConfig::with_resolver`].
#[derive(Default)]
pub struct ReactiveErrorConfig {
    error_messages: Vec<(String, MessageFn)>,
    resolver: Option<Rc<dyn MessageResolver>>,
    equality: ErrorEquality,
}

impl ReactiveErrorConfig {
    /// Configuration with the default resolver and strict equality.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one formatter.
    #[must_use]
    pub fn with_message(
        mut self,
        code: impl Into<String>,
        format: impl Fn(&str, Option<&Value>) -> String + 'static,
    ) -> Self {
        self.error_messages.push((code.into(), message_fn(format)));
        self
    }

    /// Add several formatters.
    #[must_use]
    pub fn with_messages(mut self, entries: Vec<(String, MessageFn)>) -> Self {
        self.error_messages.extend(entries);
        self
    }

    /// Substitute the resolver implementation.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Rc<dyn MessageResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_equality(mut self, equality: ErrorEquality) -> Self {
        self.equality = equality;
        self
    }

    /// Apply a loaded catalog: its messages, and its equality strategy if
    /// it names one.
    #[must_use]
    pub fn with_catalog(mut self, catalog: &MessageCatalog) -> Self {
        self.error_messages.extend(catalog.entries());
        if let Some(equality) = catalog.equality() {
            self.equality = equality;
        }
        self
    }

    /// Equality strategy the built streams will use.
    #[must_use]
    pub fn equality(&self) -> ErrorEquality {
        self.equality
    }

    /// The configured resolver with all extra messages registered.
    #[must_use]
    pub fn into_resolver(self) -> Rc<dyn MessageResolver> {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Rc::new(DefaultMessageResolver::new()));
        if !self.error_messages.is_empty() {
            debug!(count = self.error_messages.len(), "registering configured messages");
            resolver.register_messages(self.error_messages);
        }
        resolver
    }
}

impl fmt::Debug for ReactiveErrorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self
            .error_messages
            .iter()
            .map(|(code, _)| code.as_str())
            .collect();
        f.debug_struct("ReactiveErrorConfig")
            .field("error_messages", &codes)
            .field("custom_resolver", &self.resolver.is_some())
            .field("equality", &self.equality)
            .finish()
    }
}

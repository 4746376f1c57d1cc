//! Fan-out of message streams over a form.

use crate::cell::MessageCell;
use crate::config::ReactiveErrorConfig;
use crate::equality::ErrorEquality;
use crate::resolver::{DefaultMessageResolver, MessageResolver};
use crate::stream::ControlMessageStream;
use formerr_form::{ControlSource, GroupSource};
use formerr_reactive::Scope;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Builds one [`ControlMessageStream`] per field of a form.
///
/// All streams share the same resolver and equality strategy. Fields the
/// form lists but cannot produce a control for are left out of the result:
/// the returned map only has keys for controls that exist.
#[derive(Clone)]
pub struct FormMessageMap {
    resolver: Rc<dyn MessageResolver>,
    equality: ErrorEquality,
}

impl FormMessageMap {
    /// Use `resolver` with [`ErrorEquality::Strict`].
    #[must_use]
    pub fn new(resolver: Rc<dyn MessageResolver>) -> Self {
        Self::with_equality(resolver, ErrorEquality::default())
    }

    /// Use `resolver` with an explicit snapshot comparison.
    #[must_use]
    pub fn with_equality(resolver: Rc<dyn MessageResolver>, equality: ErrorEquality) -> Self {
        Self { resolver, equality }
    }

    /// Build from setup-time configuration.
    #[must_use]
    pub fn from_config(config: ReactiveErrorConfig) -> Self {
        let equality = config.equality();
        Self::with_equality(config.into_resolver(), equality)
    }

    /// Shared resolver, e.g. to register more messages later.
    #[must_use]
    pub fn resolver(&self) -> &Rc<dyn MessageResolver> {
        &self.resolver
    }

    /// Comparison used to suppress repeated snapshots.
    #[must_use]
    pub fn equality(&self) -> ErrorEquality {
        self.equality
    }

    /// Message stream for a single control.
    pub fn stream(&self, field: &str, control: Rc<dyn ControlSource>) -> ControlMessageStream {
        ControlMessageStream::new(field, control, Rc::clone(&self.resolver), self.equality)
    }

    /// Push-style: one stream per field. Dropping a stream releases its
    /// control.
    pub fn streams<G: GroupSource + ?Sized>(&self, form: &G) -> BTreeMap<String, ControlMessageStream> {
        let mut streams = BTreeMap::new();
        for name in form.control_names() {
            let Some(control) = form.control(&name) else {
                debug!(field = %name, "no control for field, skipping");
                continue;
            };
            let stream = self.stream(&name, control);
            streams.insert(name, stream);
        }
        debug!(fields = streams.len(), "built message streams");
        streams
    }

    /// Pull-style: one current-value cell per field.
    ///
    /// The streams and subscriptions feeding the cells are handed to
    /// `scope`; when it ends, the cells stop updating and keep their last
    /// value.
    pub fn cells<G: GroupSource + ?Sized>(
        &self,
        form: &G,
        scope: &Scope,
    ) -> BTreeMap<String, MessageCell> {
        self.streams(form)
            .into_iter()
            .map(|(name, stream)| {
                let (cell, subscription) = MessageCell::follow(&stream);
                scope.hold(subscription);
                scope.hold(stream);
                (name, cell)
            })
            .collect()
    }
}

impl Default for FormMessageMap {
    fn default() -> Self {
        Self::new(Rc::new(DefaultMessageResolver::new()))
    }
}

impl fmt::Debug for FormMessageMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormMessageMap")
            .field("equality", &self.equality)
            .finish_non_exhaustive()
    }
}

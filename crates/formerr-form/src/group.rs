//! Form groups

use crate::control::{ControlSource, FormControl};
use crate::snapshot::ErrorSnapshot;
use crate::{Error, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Read side of a keyed set of controls.
pub trait GroupSource {
    /// Names of the controls, in form order.
    fn control_names(&self) -> Vec<String>;

    /// Look up a control. May return `None` for a listed name when the
    /// control has gone away since enumeration.
    fn control(&self, name: &str) -> Option<Rc<dyn ControlSource>>;
}

/// Ordered collection of named controls.
///
/// Cloning yields another handle to the same group.
#[derive(Debug, Clone, Default)]
pub struct FormGroup {
    controls: Rc<RefCell<Vec<(String, FormControl)>>>,
}

impl FormGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`FormGroup::add_control`].
    #[must_use]
    pub fn with_control(self, name: impl Into<String>, control: FormControl) -> Self {
        self.add_control(name, control);
        self
    }

    /// Add a control, replacing any control registered under the same name
    /// while keeping its position.
    pub fn add_control(&self, name: impl Into<String>, control: FormControl) {
        let name = name.into();
        let mut controls = self.controls.borrow_mut();
        if let Some(slot) = controls.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = control;
        } else {
            controls.push((name, control));
        }
    }

    /// Remove a control and return it.
    pub fn remove_control(&self, name: &str) -> Option<FormControl> {
        let mut controls = self.controls.borrow_mut();
        let idx = controls.iter().position(|(existing, _)| existing == name)?;
        Some(controls.remove(idx).1)
    }

    /// Handle to a control.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FormControl> {
        self.controls
            .borrow()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, control)| control.clone())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.borrow().is_empty()
    }

    /// Update the controls named in a JSON object. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if `values` is not an object.
    pub fn patch_value(&self, values: &Value) -> Result<()> {
        let object = values
            .as_object()
            .ok_or_else(|| Error::InvalidFormat("form values must be a JSON object".to_string()))?;

        for (name, value) in object {
            match self.get(name) {
                Some(control) => control.set_value(value.clone()),
                None => debug!(field = %name, "ignoring value for unknown field"),
            }
        }
        Ok(())
    }

    /// Update controls from a JSON object that may only name known fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if `values` is not an object and
    /// [`Error::UnknownField`] if it names a field the group lacks. Nothing
    /// is applied when an error is returned.
    pub fn set_value(&self, values: &Value) -> Result<()> {
        let object = values
            .as_object()
            .ok_or_else(|| Error::InvalidFormat("form values must be a JSON object".to_string()))?;

        if let Some(unknown) = object.keys().find(|name| !self.contains(name)) {
            return Err(Error::UnknownField(unknown.clone()));
        }
        self.patch_value(values)
    }

    /// Whether every enabled control is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.controls
            .borrow()
            .iter()
            .all(|(_, control)| control.is_disabled() || control.is_valid())
    }

    /// Errors of every control, in form order.
    #[must_use]
    pub fn errors_by_field(&self) -> Vec<(String, Option<ErrorSnapshot>)> {
        self.controls
            .borrow()
            .iter()
            .map(|(name, control)| (name.clone(), control.errors()))
            .collect()
    }
}

impl GroupSource for FormGroup {
    fn control_names(&self) -> Vec<String> {
        self.controls
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn control(&self, name: &str) -> Option<Rc<dyn ControlSource>> {
        self.get(name)
            .map(|control| Rc::new(control) as Rc<dyn ControlSource>)
    }
}

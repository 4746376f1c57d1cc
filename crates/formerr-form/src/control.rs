//! Form controls

use crate::snapshot::ErrorSnapshot;
use crate::validators::{Validator, run_validators};
use formerr_reactive::Subject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Validation status of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlStatus {
    /// All validators pass
    Valid,
    /// At least one validator fails
    Invalid,
    /// Validation is in progress
    Pending,
    /// Control is excluded from validation
    Disabled,
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlStatus::Valid => "VALID",
            ControlStatus::Invalid => "INVALID",
            ControlStatus::Pending => "PENDING",
            ControlStatus::Disabled => "DISABLED",
        };
        f.write_str(name)
    }
}

/// Read side of a control, as seen by error-message consumers.
pub trait ControlSource {
    /// Current error snapshot; `None` while the control is valid.
    fn errors(&self) -> Option<ErrorSnapshot>;

    /// Current status.
    fn status(&self) -> ControlStatus;

    /// Source of status notifications. One notification is raised per
    /// value or validity update, even when the status itself is unchanged.
    /// Completes when the control is torn down.
    fn status_changes(&self) -> Subject<ControlStatus>;
}

struct ControlState {
    value: Value,
    validators: Vec<Validator>,
    errors: Option<ErrorSnapshot>,
    disabled: bool,
    pending: bool,
}

impl ControlState {
    fn status(&self) -> ControlStatus {
        if self.disabled {
            ControlStatus::Disabled
        } else if self.pending {
            ControlStatus::Pending
        } else if self.errors.is_some() {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        }
    }

    fn revalidate(&mut self) {
        self.errors = if self.disabled {
            None
        } else {
            run_validators(&self.validators, &self.value)
        };
    }
}

/// A single form field: value, validators, and derived validation state.
///
/// Cloning yields another handle to the same control.
#[derive(Clone)]
pub struct FormControl {
    state: Rc<RefCell<ControlState>>,
    status_changes: Subject<ControlStatus>,
}

impl FormControl {
    /// Create a control without validators.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self::with_validators(value, Vec::new())
    }

    /// Create a control and validate its initial value.
    #[must_use]
    pub fn with_validators(value: Value, validators: Vec<Validator>) -> Self {
        let mut state = ControlState {
            value,
            validators,
            errors: None,
            disabled: false,
            pending: false,
        };
        state.revalidate();
        Self {
            state: Rc::new(RefCell::new(state)),
            status_changes: Subject::new(),
        }
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.state.borrow().value.clone()
    }

    /// Replace the value, re-run validators and announce the status.
    pub fn set_value(&self, value: Value) {
        {
            let mut state = self.state.borrow_mut();
            state.value = value;
            state.pending = false;
            state.revalidate();
        }
        self.announce();
    }

    /// Replace the validators. Takes effect on the next validity update.
    pub fn set_validators(&self, validators: Vec<Validator>) {
        self.state.borrow_mut().validators = validators;
    }

    /// Re-run validators against the current value and announce the status.
    pub fn update_value_and_validity(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.pending = false;
            state.revalidate();
        }
        self.announce();
    }

    /// Set errors by hand, bypassing validators until the next update.
    /// An empty snapshot clears the errors.
    pub fn set_errors(&self, errors: Option<ErrorSnapshot>) {
        {
            let mut state = self.state.borrow_mut();
            state.pending = false;
            state.errors = if state.disabled {
                None
            } else {
                errors.and_then(ErrorSnapshot::into_option)
            };
        }
        self.announce();
    }

    /// Mark validation as in progress. Errors are left as they are.
    pub fn mark_pending(&self) {
        self.state.borrow_mut().pending = true;
        self.announce();
    }

    /// Exclude the control from validation. Disabled controls report no
    /// errors.
    pub fn disable(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.disabled = true;
            state.errors = None;
        }
        self.announce();
    }

    /// Re-enable the control and validate it again.
    pub fn enable(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.disabled = false;
            state.revalidate();
        }
        self.announce();
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status() == ControlStatus::Valid
    }

    /// Tear the control down: completes its status notifications. Later
    /// updates still change the state but are no longer announced.
    pub fn complete(&self) {
        self.status_changes.complete();
    }

    fn announce(&self) {
        let status = self.state.borrow().status();
        trace!(%status, "control status update");
        self.status_changes.next(status);
    }
}

impl ControlSource for FormControl {
    fn errors(&self) -> Option<ErrorSnapshot> {
        self.state.borrow().errors.clone()
    }

    fn status(&self) -> ControlStatus {
        self.state.borrow().status()
    }

    fn status_changes(&self) -> Subject<ControlStatus> {
        self.status_changes.clone()
    }
}

impl fmt::Debug for FormControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FormControl")
            .field("value", &state.value)
            .field("validators", &state.validators)
            .field("errors", &state.errors)
            .field("status", &state.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_initial_value_is_validated() {
        let control = FormControl::with_validators(json!(""), vec![Validator::Required]);
        assert_eq!(control.status(), ControlStatus::Invalid);
        assert!(control.errors().unwrap().contains("required"));
    }

    #[test]
    fn test_set_value_announces_every_update() {
        let control = FormControl::with_validators(json!("ok"), vec![Validator::Required]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = control
            .status_changes()
            .subscribe(move |status| sink.borrow_mut().push(*status));

        control.set_value(json!("still ok"));
        control.set_value(json!(""));

        assert_eq!(
            *seen.borrow(),
            vec![ControlStatus::Valid, ControlStatus::Invalid]
        );
    }

    #[test]
    fn test_set_errors_overrides_until_next_update() {
        let control = FormControl::new(json!("taken"));
        control.set_errors(Some(ErrorSnapshot::new().with("unique", json!(true))));
        assert!(control.errors().unwrap().contains("unique"));

        control.update_value_and_validity();
        assert!(control.errors().is_none());
    }

    #[test]
    fn test_empty_manual_errors_clear() {
        let control = FormControl::new(json!(1));
        control.set_errors(Some(ErrorSnapshot::new()));
        assert!(control.errors().is_none());
        assert!(control.is_valid());
    }

    #[test]
    fn test_disabled_control_reports_no_errors() {
        let control = FormControl::with_validators(json!(null), vec![Validator::Required]);
        control.disable();
        assert_eq!(control.status(), ControlStatus::Disabled);
        assert!(control.errors().is_none());

        control.enable();
        assert_eq!(control.status(), ControlStatus::Invalid);
    }

    #[test]
    fn test_pending_keeps_errors() {
        let control = FormControl::with_validators(json!(null), vec![Validator::Required]);
        control.mark_pending();
        assert_eq!(control.status(), ControlStatus::Pending);
        assert!(control.errors().is_some());
    }

    #[test]
    fn test_complete_stops_announcements() {
        let control = FormControl::new(json!(1));
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = control
            .status_changes()
            .subscribe(move |_| counter.set(counter.get() + 1));

        control.complete();
        control.set_value(json!(2));

        assert_eq!(calls.get(), 0);
        assert_eq!(control.value(), json!(2));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ControlStatus::Invalid.to_string(), "INVALID");
    }
}

//! In-memory related model with per-key validators.
//!
//! Keys are kept in insertion order. Setting a key to its current value is a
//! no-op. When validation is enabled, a rejected write leaves the stored value
//! untouched and is remembered as [`Model::validation_error`].

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::events::{Listeners, Subscription};
use crate::related::{RelatedListener, RelatedModel, ValidationError};

/// Returns an error message when `value` is not acceptable.
pub type Validator = Box<dyn Fn(&Value) -> Option<String>>;

/// A change to one key of a [`Model`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChange {
    pub key: String,
    pub value: Value,
    pub previous: Option<Value>,
}

/// An in-memory key-value model.
pub struct Model {
    attributes: RefCell<IndexMap<String, Value>>,
    validators: HashMap<String, Validator>,
    validating: bool,
    validation_error: RefCell<Option<ValidationError>>,
    listeners: Listeners<ModelChange>,
}

impl Model {
    /// A model that runs per-key validators on every `set`.
    pub fn new() -> Self {
        Self {
            attributes: RefCell::new(IndexMap::new()),
            validators: HashMap::new(),
            validating: true,
            validation_error: RefCell::new(None),
            listeners: Listeners::new(),
        }
    }

    /// A model without validation capability. Validators are ignored.
    pub fn plain() -> Self {
        Self {
            validating: false,
            ..Self::new()
        }
    }

    /// Seed an attribute.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.borrow_mut().insert(key.into(), value.into());
        self
    }

    /// Register a validator for `key`.
    pub fn with_validator(
        mut self,
        key: impl Into<String>,
        validator: impl Fn(&Value) -> Option<String> + 'static,
    ) -> Self {
        self.validators.insert(key.into(), Box::new(validator));
        self
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.borrow().get(key).cloned()
    }

    /// Validate and store `value` under `key`, notifying listeners on change.
    pub fn set(&self, key: &str, value: Value) -> Result<(), ValidationError> {
        if let Some(message) = self.validate(key, &value) {
            let error = ValidationError::new(key, message);
            debug!(key, error = %error, "model rejected value");
            *self.validation_error.borrow_mut() = Some(error.clone());
            return Err(error);
        }
        *self.validation_error.borrow_mut() = None;

        let previous = {
            let mut attributes = self.attributes.borrow_mut();
            if attributes.get(key) == Some(&value) {
                return Ok(());
            }
            attributes.insert(key.to_string(), value.clone())
        };

        trace!(key, "model value changed");
        self.listeners.emit(
            key,
            &ModelChange {
                key: key.to_string(),
                value,
                previous,
            },
        );
        Ok(())
    }

    /// The error from the most recent rejected `set`, cleared by the next accepted one.
    pub fn validation_error(&self) -> Option<ValidationError> {
        self.validation_error.borrow().clone()
    }

    /// Listen for changes to `key`, or to every key when `None`.
    pub fn on_change(
        &self,
        key: Option<&str>,
        listener: impl Fn(&ModelChange) + 'static,
    ) -> Subscription {
        self.listeners.subscribe(key, listener)
    }

    /// Snapshot of every attribute.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.attributes
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    fn validate(&self, key: &str, value: &Value) -> Option<String> {
        if !self.validating {
            return None;
        }
        self.validators.get(key).and_then(|validator| validator(value))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("attributes", &self.attributes.borrow())
            .field("validating", &self.validating)
            .finish()
    }
}

impl RelatedModel for Model {
    fn get(&self, key: &str) -> Option<Value> {
        Model::get(self, key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ValidationError> {
        Model::set(self, key, value)
    }

    fn subscribe(&self, key: &str, listener: RelatedListener) -> Subscription {
        self.on_change(Some(key), move |change| listener(&change.value))
    }

    fn supports_validation(&self) -> bool {
        self.validating
    }
}

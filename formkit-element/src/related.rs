//! The capability an external key-value model must offer to be bound to an element.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::error::{ElementError, Result};
use crate::events::Subscription;

/// A per-attribute validation failure reported by a related model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Callback invoked with the new value of a related-model key.
pub type RelatedListener = Box<dyn Fn(&Value)>;

/// An externally owned key-value entity an element can mirror.
///
/// Elements hold only a weak relation to the model; whoever created it keeps
/// it alive.
pub trait RelatedModel {
    /// Current value of `key`, or `None` when the model has no such key.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write `value` to `key`. A model with per-attribute validation rejects
    /// invalid values with an error and leaves the stored value unchanged.
    fn set(&self, key: &str, value: Value) -> std::result::Result<(), ValidationError>;

    /// Call `listener` whenever the value stored under `key` changes.
    fn subscribe(&self, key: &str, listener: RelatedListener) -> Subscription;

    /// Whether `set` runs per-attribute validation.
    fn supports_validation(&self) -> bool {
        false
    }
}

/// What was supplied as the `related_model` option.
///
/// Only [`RelatedSource::Model`] can be bound. Plain data (for instance a
/// mapping read from a YAML document) fails construction.
#[derive(Clone)]
pub enum RelatedSource {
    Model(Rc<dyn RelatedModel>),
    Data(Value),
}

impl RelatedSource {
    /// The model, or [`ElementError::RelatedModelType`] for plain data.
    pub fn into_model(self) -> Result<Rc<dyn RelatedModel>> {
        match self {
            RelatedSource::Model(model) => Ok(model),
            RelatedSource::Data(_) => Err(ElementError::RelatedModelType),
        }
    }
}

impl<M: RelatedModel + 'static> From<Rc<M>> for RelatedSource {
    fn from(model: Rc<M>) -> Self {
        RelatedSource::Model(model)
    }
}

impl From<Value> for RelatedSource {
    fn from(data: Value) -> Self {
        RelatedSource::Data(data)
    }
}

impl fmt::Debug for RelatedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelatedSource::Model(model) => f
                .debug_struct("Model")
                .field("supports_validation", &model.supports_validation())
                .finish(),
            RelatedSource::Data(data) => f.debug_tuple("Data").field(data).finish(),
        }
    }
}

impl<'de> Deserialize<'de> for RelatedSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RelatedSource::Data)
    }
}

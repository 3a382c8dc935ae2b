//! Error types for element construction and mutation

use formkit_fields::{FieldType, FieldsError};
use thiserror::Error;

/// Result type for element operations
pub type Result<T> = std::result::Result<T, ElementError>;

/// Errors that can occur while building or mutating elements.
///
/// Validation failures reported by a related model are not errors; they are
/// surfaced through the element's `error` attribute.
#[derive(Debug, Error)]
pub enum ElementError {
    /// The options failed the type registry
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// `related_model` was plain data instead of a model
    #[error("Related model must be a model.")]
    RelatedModelType,

    /// Attribute cannot change after construction
    #[error("attribute '{attribute}' is immutable")]
    ImmutableAttribute { attribute: String },

    /// Attribute value has the wrong shape
    #[error("invalid value for {attribute}: {message}")]
    InvalidAttribute { attribute: String, message: String },

    /// `values` was set on a type without a child collection
    #[error("{field_type} has no values collection")]
    NoChildCollection { field_type: FieldType },

    /// A pre-built child was not a radio element
    #[error("child {index} must be a radio element, got {found}")]
    ChildType { index: usize, found: FieldType },

    /// A derived child element failed to construct
    #[error("child {index} failed to construct: {source}")]
    ChildConstruction {
        index: usize,
        #[source]
        source: Box<ElementError>,
    },

    /// An element of a form document failed to construct
    #[error("element '{name}': {source}")]
    InForm {
        name: String,
        #[source]
        source: Box<ElementError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ElementError {
    /// Create an immutable attribute error
    pub fn immutable(attribute: impl Into<String>) -> Self {
        Self::ImmutableAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create an invalid attribute error
    pub fn invalid_attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Whether the failure was a missing or unknown `type`, at any depth.
    pub fn is_type_error(&self) -> bool {
        match self {
            Self::Fields(e) => e.is_type_error(),
            Self::ChildConstruction { source, .. } | Self::InForm { source, .. } => {
                source.is_type_error()
            }
            _ => false,
        }
    }
}

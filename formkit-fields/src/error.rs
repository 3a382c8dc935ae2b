//! Error types for the field type registry

use thiserror::Error;

use crate::types::{FieldType, Part};

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Construction errors raised while resolving element options against a type contract
#[derive(Debug, Error)]
pub enum FieldsError {
    /// `type` was missing, null or empty
    #[error("Element requires a type.")]
    MissingType,

    /// `type` named something outside the known set
    #[error("Element requires a valid type, got '{given}'.")]
    InvalidType { given: String },

    /// A collection type was built without `values`
    #[error("{field_type} requires values")]
    MissingValues { field_type: FieldType },

    /// A collection type that needs at least one entry got none
    #[error("{field_type} requires at least one value")]
    EmptyValues { field_type: FieldType },

    /// A type that has no default value was built without one
    #[error("{field_type} requires an explicit value")]
    MissingValue { field_type: FieldType },

    /// A composite type is missing one of its sub-option payloads
    #[error("{field_type} is missing its '{part}' payload")]
    MissingPart { field_type: FieldType, part: Part },

    /// A composite type's sub-option payload failed its own validation
    #[error("invalid '{part}' payload: {source}")]
    InvalidPart {
        part: Part,
        #[source]
        source: Box<FieldsError>,
    },

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldsError {
    /// Create an invalid type error
    pub fn invalid_type(given: impl Into<String>) -> Self {
        Self::InvalidType {
            given: given.into(),
        }
    }

    /// Whether this error rejects the `type` option itself.
    ///
    /// Errors nested inside a composite payload count too, since the
    /// payload's own `type` is what failed.
    pub fn is_type_error(&self) -> bool {
        match self {
            Self::MissingType | Self::InvalidType { .. } => true,
            Self::InvalidPart { source, .. } => source.is_type_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_type_display() {
        assert_eq!(
            FieldsError::MissingType.to_string(),
            "Element requires a type."
        );
    }

    #[test]
    fn test_invalid_type_display() {
        let err = FieldsError::invalid_type("slider");
        assert!(err.to_string().contains("slider"));
        assert!(err.is_type_error());
    }

    #[test]
    fn test_requirement_errors_name_the_type() {
        let err = FieldsError::MissingValue {
            field_type: FieldType::Radio,
        };
        assert_eq!(err.to_string(), "radio requires an explicit value");
        assert!(!err.is_type_error());

        let err = FieldsError::MissingPart {
            field_type: FieldType::Buttonfield,
            part: Part::Button,
        };
        assert_eq!(err.to_string(), "buttonfield is missing its 'button' payload");
    }

    #[test]
    fn test_invalid_part_propagates_type_error() {
        let err = FieldsError::InvalidPart {
            part: Part::Input,
            source: Box::new(FieldsError::MissingType),
        };
        assert!(err.is_type_error());
        assert!(err.to_string().contains("input"));
    }
}

//! Core field types for the registry.
//!
//! A [`FieldType`] names what kind of form element is being built. A
//! [`Choice`] is the `{value, label}` pair that select options and radioset
//! children are derived from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldsError;

/// The type of an element. Determines its defaults and derived collections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Radioset,
    /// Composite of an input and a button, built from two nested payloads.
    Buttonfield,
    Submit,
    Reset,
    Button,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Password,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Radioset,
        FieldType::Buttonfield,
        FieldType::Submit,
        FieldType::Reset,
        FieldType::Button,
    ];

    /// The identifier used in options and on the `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Password => "password",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Radioset => "radioset",
            FieldType::Buttonfield => "buttonfield",
            FieldType::Submit => "submit",
            FieldType::Reset => "reset",
            FieldType::Button => "button",
        }
    }

    /// Submit, reset and plain buttons.
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            FieldType::Submit | FieldType::Reset | FieldType::Button
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FieldsError::MissingType);
        }
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FieldsError::invalid_type(s))
    }
}

/// The two nested payloads of a buttonfield.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Input,
    Button,
}

impl Part {
    pub fn as_str(&self) -> &'static str {
        match self {
            Part::Input => "input",
            Part::Button => "button",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `{value, label}` entry of a select or radioset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl<V: Into<String>, L: Into<String>> From<(V, L)> for Choice {
    fn from((value, label): (V, L)) -> Self {
        Choice::new(value, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_parses_every_identifier() {
        for ft in FieldType::ALL {
            assert_eq!(ft.as_str().parse::<FieldType>().unwrap(), ft);
        }
    }

    #[test]
    fn field_type_rejects_unknown_and_empty() {
        let err = "slider".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, FieldsError::InvalidType { ref given } if given == "slider"));

        let err = "".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, FieldsError::MissingType));
    }

    #[test]
    fn field_type_is_case_sensitive() {
        assert!("Text".parse::<FieldType>().is_err());
        assert!("SELECT".parse::<FieldType>().is_err());
    }

    #[test]
    fn field_type_yaml_uses_lowercase() {
        let yaml = serde_yaml_ng::to_string(&FieldType::Buttonfield).unwrap();
        assert_eq!(yaml.trim(), "buttonfield");
        let parsed: FieldType = serde_yaml_ng::from_str("radioset").unwrap();
        assert_eq!(parsed, FieldType::Radioset);
    }

    #[test]
    fn action_types() {
        let actions: Vec<_> = FieldType::ALL.iter().filter(|t| t.is_action()).collect();
        assert_eq!(
            actions,
            vec![&FieldType::Submit, &FieldType::Reset, &FieldType::Button]
        );
    }

    #[test]
    fn choice_label_defaults_to_empty() {
        let choice: Choice = serde_yaml_ng::from_str("value: foo").unwrap();
        assert_eq!(choice, Choice::new("foo", ""));
    }

    #[test]
    fn choice_from_tuple() {
        let choice: Choice = ("P0", "Critical").into();
        assert_eq!(choice.value, "P0");
        assert_eq!(choice.label, "Critical");
    }
}

//! Type registry: resolves raw construction options against a type contract.
//!
//! Every [`FieldType`] has exactly one [`TypeContract`], selected by an
//! exhaustive `match` in [`contract`]. Resolution validates the options in a
//! fixed order (type first, then the type's requirements) and returns the
//! defaults and child-collection kind the element should apply.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::types::{FieldType, Part};

/// Read-only view of construction options, as the validator needs them.
///
/// Implemented by whatever type a consumer uses to carry element options.
pub trait OptionsView {
    /// The raw `type` option. `None` for missing or null.
    fn type_name(&self) -> Option<&str>;

    /// Whether a `value` was supplied. An empty string counts.
    fn has_value(&self) -> bool;

    /// Number of entries in `values`, or `None` when `values` is absent.
    fn values_len(&self) -> Option<usize>;

    /// A nested payload of a composite type.
    fn part(&self, part: Part) -> Option<&dyn OptionsView>;
}

/// Which of the two historical contracts the registry enforces.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ContractVersion {
    /// The earlier defaults: checkbox defaults to `false` and select may omit
    /// `values`. Type validation is the same as [`ContractVersion::Strict`].
    #[serde(alias = "legacy")]
    LegacyDefaults,
    #[default]
    Strict,
}

/// Registry configuration, usually read from the `registry:` section of a form document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub contract: ContractVersion,
}

impl RegistryConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

/// An option a type cannot be constructed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// `values` must be present; an empty list is fine.
    Values,
    /// `values` must be present and non-empty.
    NonEmptyValues,
    /// `value` must be present.
    Value,
    /// Both `input` and `button` payloads must be present and valid.
    Parts,
}

/// The derived collection a type keeps under `values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    None,
    /// Select options.
    Options,
    /// Radio child elements.
    Elements,
}

/// Default for the `value` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// No default; the caller must supply one.
    Required,
    EmptyString,
    False,
}

impl DefaultValue {
    pub fn to_value(self) -> Option<Value> {
        match self {
            DefaultValue::Required => None,
            DefaultValue::EmptyString => Some(Value::String(String::new())),
            DefaultValue::False => Some(Value::Bool(false)),
        }
    }
}

/// Attribute defaults applied where the caller supplied nothing.
///
/// The three presentational flags are tri-state: `None` means null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub value: DefaultValue,
    pub label: Option<&'static str>,
    pub show_label_before: Option<bool>,
    pub show_label_after: Option<bool>,
    pub show_error: Option<bool>,
}

/// The construction contract for one field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeContract {
    pub field_type: FieldType,
    pub requires: &'static [Requirement],
    pub defaults: Defaults,
    pub children: ChildKind,
}

const fn input_contract(field_type: FieldType) -> TypeContract {
    TypeContract {
        field_type,
        requires: &[],
        defaults: Defaults {
            value: DefaultValue::EmptyString,
            label: None,
            show_label_before: Some(true),
            show_label_after: None,
            show_error: Some(true),
        },
        children: ChildKind::None,
    }
}

const fn action_contract(field_type: FieldType, label: Option<&'static str>) -> TypeContract {
    TypeContract {
        field_type,
        requires: &[],
        defaults: Defaults {
            value: DefaultValue::EmptyString,
            label,
            show_label_before: Some(false),
            show_label_after: Some(false),
            show_error: Some(false),
        },
        children: ChildKind::None,
    }
}

const TEXT: TypeContract = input_contract(FieldType::Text);
const PASSWORD: TypeContract = input_contract(FieldType::Password);
const TEXTAREA: TypeContract = input_contract(FieldType::Textarea);

const SELECT: TypeContract = TypeContract {
    requires: &[Requirement::Values],
    children: ChildKind::Options,
    ..input_contract(FieldType::Select)
};

const CHECKBOX: TypeContract = TypeContract {
    field_type: FieldType::Checkbox,
    requires: &[],
    defaults: Defaults {
        value: DefaultValue::EmptyString,
        label: None,
        show_label_before: None,
        show_label_after: Some(true),
        show_error: Some(true),
    },
    children: ChildKind::None,
};

const RADIO: TypeContract = TypeContract {
    field_type: FieldType::Radio,
    requires: &[Requirement::Value],
    defaults: Defaults {
        value: DefaultValue::Required,
        label: None,
        show_label_before: None,
        show_label_after: Some(true),
        show_error: None,
    },
    children: ChildKind::None,
};

const RADIOSET: TypeContract = TypeContract {
    requires: &[Requirement::NonEmptyValues],
    children: ChildKind::Elements,
    ..input_contract(FieldType::Radioset)
};

const BUTTONFIELD: TypeContract = TypeContract {
    requires: &[Requirement::Parts],
    ..input_contract(FieldType::Buttonfield)
};

const SUBMIT: TypeContract = action_contract(FieldType::Submit, Some("Submit"));
const RESET: TypeContract = action_contract(FieldType::Reset, Some("Reset"));
const BUTTON: TypeContract = action_contract(FieldType::Button, None);

/// The strict contract for a field type.
pub fn contract(field_type: FieldType) -> &'static TypeContract {
    match field_type {
        FieldType::Text => &TEXT,
        FieldType::Password => &PASSWORD,
        FieldType::Textarea => &TEXTAREA,
        FieldType::Select => &SELECT,
        FieldType::Checkbox => &CHECKBOX,
        FieldType::Radio => &RADIO,
        FieldType::Radioset => &RADIOSET,
        FieldType::Buttonfield => &BUTTONFIELD,
        FieldType::Submit => &SUBMIT,
        FieldType::Reset => &RESET,
        FieldType::Button => &BUTTON,
    }
}

/// Fully resolved configuration for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub field_type: FieldType,
    pub defaults: Defaults,
    pub children: ChildKind,
    /// Resolved `(input, button)` payloads for a buttonfield.
    pub parts: Option<Box<(ResolvedType, ResolvedType)>>,
}

/// Validates construction options and hands back the contract to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    config: RegistryConfig,
}

impl TypeRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    /// A registry applying the earlier checkbox and select defaults.
    pub fn legacy_defaults() -> Self {
        Self::new(RegistryConfig {
            contract: ContractVersion::LegacyDefaults,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The contract for a type, adjusted for the configured version.
    pub fn contract_for(&self, field_type: FieldType) -> TypeContract {
        let strict = *contract(field_type);
        if self.config.contract == ContractVersion::Strict {
            return strict;
        }
        match field_type {
            FieldType::Checkbox => TypeContract {
                defaults: Defaults {
                    value: DefaultValue::False,
                    ..strict.defaults
                },
                ..strict
            },
            FieldType::Select => TypeContract {
                requires: &[],
                ..strict
            },
            _ => strict,
        }
    }

    /// Validate `options` and resolve the contract to apply.
    ///
    /// The `type` option is checked before any type-specific requirement.
    pub fn resolve(&self, options: &dyn OptionsView) -> Result<ResolvedType> {
        let field_type = match options.type_name() {
            None => return Err(FieldsError::MissingType),
            Some(raw) => raw.parse::<FieldType>()?,
        };
        let contract = self.contract_for(field_type);

        let mut parts = None;
        for requirement in contract.requires {
            match requirement {
                Requirement::Values => {
                    if options.values_len().is_none() {
                        return Err(FieldsError::MissingValues { field_type });
                    }
                }
                Requirement::NonEmptyValues => match options.values_len() {
                    None => return Err(FieldsError::MissingValues { field_type }),
                    Some(0) => return Err(FieldsError::EmptyValues { field_type }),
                    Some(_) => {}
                },
                Requirement::Value => {
                    if !options.has_value() {
                        return Err(FieldsError::MissingValue { field_type });
                    }
                }
                Requirement::Parts => {
                    let input = self.resolve_part(field_type, options, Part::Input)?;
                    let button = self.resolve_part(field_type, options, Part::Button)?;
                    parts = Some(Box::new((input, button)));
                }
            }
        }

        debug!(
            field_type = %field_type,
            contract = ?self.config.contract,
            "resolved element options"
        );

        Ok(ResolvedType {
            field_type,
            defaults: contract.defaults,
            children: contract.children,
            parts,
        })
    }

    fn resolve_part(
        &self,
        field_type: FieldType,
        options: &dyn OptionsView,
        part: Part,
    ) -> Result<ResolvedType> {
        let payload = options
            .part(part)
            .ok_or(FieldsError::MissingPart { field_type, part })?;
        self.resolve(payload)
            .map_err(|source| FieldsError::InvalidPart {
                part,
                source: Box::new(source),
            })
    }
}

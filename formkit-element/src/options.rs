//! Construction options for an element.
//!
//! [`ElementOptions`] is built in code with its chained setters or read from
//! YAML/JSON. Unrecognized keys are kept and become passthrough attributes.

use formkit_fields::{Choice, OptionsView, Part};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::collections::{ElementList, OptionList};
use crate::error::Result;
use crate::related::RelatedSource;

/// Where an element's `values` collection comes from.
#[derive(Debug, Clone)]
pub enum ValuesSource {
    /// Plain `{value, label}` pairs.
    Choices(Vec<Choice>),
    /// A pre-built select option list.
    Options(OptionList),
    /// A pre-built list of radio elements.
    Elements(ElementList),
}

impl ValuesSource {
    pub fn len(&self) -> usize {
        match self {
            ValuesSource::Choices(choices) => choices.len(),
            ValuesSource::Options(options) => options.len(),
            ValuesSource::Elements(elements) => elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `{value, label}` pairs, whatever the source.
    pub fn choices(&self) -> Vec<Choice> {
        match self {
            ValuesSource::Choices(choices) => choices.clone(),
            ValuesSource::Options(options) => options.choices(),
            ValuesSource::Elements(elements) => elements.choices(),
        }
    }
}

impl From<Vec<Choice>> for ValuesSource {
    fn from(choices: Vec<Choice>) -> Self {
        ValuesSource::Choices(choices)
    }
}

impl From<OptionList> for ValuesSource {
    fn from(options: OptionList) -> Self {
        ValuesSource::Options(options)
    }
}

impl From<ElementList> for ValuesSource {
    fn from(elements: ElementList) -> Self {
        ValuesSource::Elements(elements)
    }
}

impl<'de> Deserialize<'de> for ValuesSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<Choice>::deserialize(deserializer).map(ValuesSource::Choices)
    }
}

/// Options an element is constructed from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementOptions {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub value: Option<Value>,
    pub label: Option<String>,
    pub values: Option<ValuesSource>,
    pub related_model: Option<RelatedSource>,
    pub related_key: Option<String>,
    pub input: Option<Box<ElementOptions>>,
    pub button: Option<Box<ElementOptions>>,
    pub name: Option<String>,
    #[serde(rename = "className", alias = "class_name")]
    pub class_name: Option<String>,
    pub disabled: Option<bool>,
    pub show_label_before: Option<bool>,
    pub show_label_after: Option<bool>,
    pub show_error: Option<bool>,
    /// Anything else, kept as passthrough attributes.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ElementOptions {
    pub fn new(type_: impl Into<String>) -> Self {
        Self {
            type_: Some(type_.into()),
            ..Default::default()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn from_json(json: Value) -> Result<Self> {
        Ok(serde_json::from_value(json)?)
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn values(mut self, values: impl Into<ValuesSource>) -> Self {
        self.values = Some(values.into());
        self
    }

    /// Set `values` from `(value, label)` pairs.
    pub fn choices<I, C>(self, choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        let choices: Vec<Choice> = choices.into_iter().map(Into::into).collect();
        self.values(choices)
    }

    pub fn related_model(mut self, model: impl Into<RelatedSource>) -> Self {
        self.related_model = Some(model.into());
        self
    }

    pub fn related_key(mut self, key: impl Into<String>) -> Self {
        self.related_key = Some(key.into());
        self
    }

    pub fn input(mut self, input: ElementOptions) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn button(mut self, button: ElementOptions) -> Self {
        self.button = Some(Box::new(button));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Add a passthrough attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl OptionsView for ElementOptions {
    fn type_name(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    fn has_value(&self) -> bool {
        self.value.is_some()
    }

    fn values_len(&self) -> Option<usize> {
        self.values.as_ref().map(ValuesSource::len)
    }

    fn part(&self, part: Part) -> Option<&dyn OptionsView> {
        let payload = match part {
            Part::Input => self.input.as_deref(),
            Part::Button => self.button.as_deref(),
        };
        payload.map(|options| options as &dyn OptionsView)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_fields() {
        let options = ElementOptions::new("select")
            .value("b")
            .choices([("a", "A"), ("b", "B")])
            .class_name("wide")
            .attr("placeholder", "Pick one");

        assert_eq!(options.type_name(), Some("select"));
        assert!(options.has_value());
        assert_eq!(options.values_len(), Some(2));
        assert_eq!(options.extra["placeholder"], json!("Pick one"));
    }

    #[test]
    fn yaml_options() {
        let options = ElementOptions::from_yaml(
            r#"
type: buttonfield
className: search
data-role: search
input:
  type: text
button:
  type: submit
  label: Go
"#,
        )
        .unwrap();

        assert_eq!(options.type_.as_deref(), Some("buttonfield"));
        assert_eq!(options.class_name.as_deref(), Some("search"));
        assert_eq!(options.extra["data-role"], json!("search"));
        assert!(options.part(Part::Input).is_some());
        assert_eq!(
            options.button.as_ref().unwrap().label.as_deref(),
            Some("Go")
        );
    }

    #[test]
    fn null_type_reads_as_missing() {
        let options = ElementOptions::from_json(json!({ "type": null })).unwrap();
        assert_eq!(options.type_name(), None);
    }

    #[test]
    fn empty_string_value_counts_as_supplied() {
        let options = ElementOptions::from_json(json!({ "type": "radio", "value": "" })).unwrap();
        assert!(options.has_value());
    }

    #[test]
    fn class_name_alias() {
        let options = ElementOptions::from_yaml("type: text\nclass_name: narrow").unwrap();
        assert_eq!(options.class_name.as_deref(), Some("narrow"));
    }

    #[test]
    fn yaml_values_are_choices() {
        let options = ElementOptions::from_yaml(
            "type: radioset\nvalues:\n  - { value: '', label: None }\n  - { value: foo, label: Foo }",
        )
        .unwrap();
        let values = options.values.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values.choices()[1], Choice::new("foo", "Foo"));
    }
}

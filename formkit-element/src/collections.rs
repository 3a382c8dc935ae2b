//! Derived `values` collections: select options and radioset children.
//!
//! Both collections keep at most one entry marked, the first whose value
//! equals the parent's current value. Duplicate values resolve to the first
//! occurrence; no match leaves every entry unmarked.

use formkit_fields::{Choice, FieldType, TypeRegistry};
use serde::Serialize;
use serde_json::{json, Value};

use crate::element::{Element, ElementId};
use crate::error::{ElementError, Result};
use crate::events::SetMeta;
use crate::options::ElementOptions;

/// One entry of a select's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Index of the first choice whose value equals `current`.
fn first_match<'a>(mut values: impl Iterator<Item = &'a str>, current: &Value) -> Option<usize> {
    let current = current.as_str()?;
    values.position(|v| v == current)
}

/// The ordered option list of a select element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionList {
    options: Vec<SelectOption>,
}

impl OptionList {
    /// Build options from `choices`, selecting the first that matches `current`.
    pub fn build(choices: &[Choice], current: &Value) -> Self {
        let mut list = Self {
            options: choices
                .iter()
                .map(|c| SelectOption {
                    value: c.value.clone(),
                    label: c.label.clone(),
                    selected: false,
                })
                .collect(),
        };
        list.select(current);
        list
    }

    /// Re-derive `selected` for `current`.
    pub fn select(&mut self, current: &Value) {
        let hit = first_match(self.options.iter().map(|o| o.value.as_str()), current);
        for (i, option) in self.options.iter_mut().enumerate() {
            option.selected = Some(i) == hit;
        }
    }

    pub fn selected(&self) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.selected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SelectOption> {
        self.options.get(index)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.options
            .iter()
            .map(|o| Choice::new(o.value.clone(), o.label.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The radio children of a radioset element.
///
/// Cloning is cheap: the list holds element handles.
#[derive(Debug, Clone, Default)]
pub struct ElementList {
    elements: Vec<Element>,
}

impl ElementList {
    /// Build one radio element per choice, grouped under `parent`.
    pub fn build(
        registry: &TypeRegistry,
        choices: &[Choice],
        parent: ElementId,
        current: &Value,
    ) -> Result<Self> {
        let elements = choices
            .iter()
            .enumerate()
            .map(|(index, choice)| {
                let options = ElementOptions::new(FieldType::Radio.as_str())
                    .value(choice.value.clone())
                    .label(choice.label.clone())
                    .name(parent.to_string());
                Element::build(registry, options).map_err(|source| {
                    ElementError::ChildConstruction {
                        index,
                        source: Box::new(source),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let list = Self { elements };
        list.check(current);
        Ok(list)
    }

    /// Take over pre-built radio elements, regrouping them under `parent`.
    pub fn adopt(elements: Vec<Element>, parent: ElementId, current: &Value) -> Result<Self> {
        for (index, element) in elements.iter().enumerate() {
            if element.field_type() != FieldType::Radio {
                return Err(ElementError::ChildType {
                    index,
                    found: element.field_type(),
                });
            }
        }
        for element in &elements {
            element.write_attribute("name", json!(parent.to_string()), SetMeta::derived());
        }

        let list = Self { elements };
        list.check(current);
        Ok(list)
    }

    /// Re-derive `checked` for `current`.
    ///
    /// Values are compared as JSON, so a non-string radio never matches a
    /// string parent value. Every other child is unchecked before the match
    /// is checked; listeners never observe two checked children.
    pub fn check(&self, current: &Value) {
        let hit = self.elements.iter().position(|e| e.value() == *current);
        for (i, element) in self.elements.iter().enumerate() {
            if Some(i) != hit {
                element.write_attribute("checked", Value::Bool(false), SetMeta::derived());
            }
        }
        if let Some(element) = hit.and_then(|i| self.elements.get(i)) {
            element.write_attribute("checked", Value::Bool(true), SetMeta::derived());
        }
    }

    pub fn checked(&self) -> Option<&Element> {
        self.elements.iter().find(|e| e.checked() == Some(true))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.elements
            .iter()
            .map(|e| {
                Choice::new(
                    e.value().as_str().unwrap_or_default(),
                    e.label().unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.elements
                .iter()
                .map(|e| {
                    json!({
                        "value": e.value(),
                        "label": e.label(),
                        "name": e.name(),
                        "checked": e.checked().unwrap_or(false),
                    })
                })
                .collect(),
        )
    }
}

impl From<Vec<Element>> for ElementList {
    fn from(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

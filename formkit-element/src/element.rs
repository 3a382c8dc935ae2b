//! The element entity: one form field, its derived collections and change notification.
//!
//! An element is a cheap-to-clone handle. All state lives behind the handle
//! so that listeners (views, the related-model binding) can observe and update
//! the same element. Attributes are an insertion-ordered map of JSON values;
//! the typed accessors read from it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use formkit_fields::{ChildKind, FieldType, ResolvedType, TypeRegistry};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};
use ulid::Ulid;

use crate::binding::Binding;
use crate::collections::{ElementList, OptionList};
use crate::error::{ElementError, Result};
use crate::events::{ChangeEvent, Listeners, SetMeta, Subscription};
use crate::options::{ElementOptions, ValuesSource};
use crate::related::{RelatedModel, RelatedSource};

/// Attributes owned by typed state rather than the attribute map.
const RESERVED: &[&str] = &[
    "type",
    "values",
    "related_model",
    "input",
    "button",
    "checked",
];

/// Stable per-instance identifier, used as the grouping key of radio children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Ulid);

impl ElementId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
pub(crate) enum Children {
    #[default]
    None,
    Options(OptionList),
    Elements(ElementList),
}

#[derive(Default)]
pub(crate) struct ElementState {
    pub(crate) attributes: IndexMap<String, Value>,
    pub(crate) children: Children,
    pub(crate) related_model: Option<Weak<dyn RelatedModel>>,
    pub(crate) input: Option<Element>,
    pub(crate) button: Option<Element>,
}

pub(crate) struct ElementInner {
    pub(crate) id: ElementId,
    pub(crate) field_type: FieldType,
    pub(crate) registry: TypeRegistry,
    pub(crate) state: RefCell<ElementState>,
    pub(crate) listeners: Listeners<ChangeEvent>,
    pub(crate) binding: RefCell<Option<Binding>>,
    /// Bumped on every rebind; a rebind that sees it move was superseded.
    pub(crate) rebinds: Cell<u64>,
}

/// A form field entity.
#[derive(Clone)]
pub struct Element {
    pub(crate) inner: Rc<ElementInner>,
}

impl Element {
    /// Build an element under the strict contract.
    pub fn new(options: ElementOptions) -> Result<Self> {
        Self::build(&TypeRegistry::default(), options)
    }

    /// Validate `options` against `registry` and build the element.
    ///
    /// Nothing is returned on failure; a failing child or buttonfield part
    /// fails the whole construction.
    pub fn build(registry: &TypeRegistry, options: ElementOptions) -> Result<Self> {
        let resolved = registry.resolve(&options)?;
        let related_model = options
            .related_model
            .clone()
            .map(RelatedSource::into_model)
            .transpose()?;

        let id = ElementId::new();
        let field_type = resolved.field_type;
        let attributes = initial_attributes(&resolved, &options);
        let value = attributes.get("value").cloned().unwrap_or(Value::Null);

        let children = match resolved.children {
            ChildKind::None => Children::None,
            ChildKind::Options => {
                let choices = options
                    .values
                    .as_ref()
                    .map(ValuesSource::choices)
                    .unwrap_or_default();
                Children::Options(OptionList::build(&choices, &value))
            }
            ChildKind::Elements => {
                Children::Elements(build_elements(registry, options.values.clone(), id, &value)?)
            }
        };

        let (input, button) = match (options.input, options.button) {
            (Some(input), Some(button)) if resolved.parts.is_some() => (
                Some(Element::build(registry, *input)?),
                Some(Element::build(registry, *button)?),
            ),
            _ => (None, None),
        };

        let element = Element {
            inner: Rc::new(ElementInner {
                id,
                field_type,
                registry: *registry,
                state: RefCell::new(ElementState {
                    attributes,
                    children,
                    related_model: related_model.as_ref().map(Rc::downgrade),
                    input,
                    button,
                }),
                listeners: Listeners::new(),
                binding: RefCell::new(None),
                rebinds: Cell::new(0),
            }),
        };

        debug!(element = %id, field_type = %field_type, "constructed element");

        if related_model.is_some() {
            element.rebind();
        }
        Ok(element)
    }

    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    pub fn field_type(&self) -> FieldType {
        self.inner.field_type
    }

    /// Read an attribute.
    ///
    /// `values` reads as a JSON snapshot of the collection; `related_model`,
    /// `input` and `button` have typed accessors instead and read as `None`.
    pub fn get(&self, attribute: &str) -> Option<Value> {
        let state = self.inner.state.borrow();
        match attribute {
            "values" => match &state.children {
                Children::None => None,
                Children::Options(options) => Some(options.to_json()),
                Children::Elements(elements) => Some(elements.to_json()),
            },
            "related_model" | "input" | "button" => None,
            _ => state.attributes.get(attribute).cloned(),
        }
    }

    /// Set an attribute as the caller.
    pub fn set(&self, attribute: &str, value: impl Into<Value>) -> Result<()> {
        self.set_with(attribute, value.into(), SetMeta::default())
    }

    /// Set an attribute with explicit origin and notification options.
    ///
    /// `type`, `input` and `button` are immutable. `values` takes a list of
    /// `{value, label}` pairs and rebuilds the collection. `related_model`
    /// only accepts null here; use [`Element::set_related_model`] to attach one.
    pub fn set_with(&self, attribute: &str, value: Value, meta: SetMeta) -> Result<()> {
        match attribute {
            "type" => {
                if value.as_str() == Some(self.field_type().as_str()) {
                    Ok(())
                } else {
                    Err(ElementError::immutable("type"))
                }
            }
            "input" | "button" => Err(ElementError::immutable(attribute)),
            "values" => {
                let choices = serde_json::from_value(value).map_err(|e| {
                    ElementError::invalid_attribute("values", e.to_string())
                })?;
                self.set_values(ValuesSource::Choices(choices))
            }
            "related_model" => {
                if value.is_null() {
                    self.clear_related_model();
                    Ok(())
                } else {
                    Err(ElementError::RelatedModelType)
                }
            }
            _ => {
                self.write_attribute(attribute, value, meta);
                Ok(())
            }
        }
    }

    /// Replace the derived `values` collection.
    pub fn set_values(&self, source: impl Into<ValuesSource>) -> Result<()> {
        let source = source.into();
        let value = self.value();
        let children = match self.field_type() {
            FieldType::Select => Children::Options(OptionList::build(&source.choices(), &value)),
            FieldType::Radioset => {
                if source.is_empty() {
                    return Err(formkit_fields::FieldsError::EmptyValues {
                        field_type: FieldType::Radioset,
                    }
                    .into());
                }
                Children::Elements(build_elements(
                    &self.inner.registry,
                    Some(source),
                    self.id(),
                    &value,
                )?)
            }
            field_type => return Err(ElementError::NoChildCollection { field_type }),
        };

        let previous = self.get("values").unwrap_or(Value::Null);
        self.inner.state.borrow_mut().children = children;
        let snapshot = self.get("values").unwrap_or(Value::Null);
        self.notify("values", snapshot, previous, SetMeta::derived());
        Ok(())
    }

    /// Attach a related model and rebind.
    ///
    /// Listeners on the previous model are detached before the new binding
    /// is made. Plain data fails with [`ElementError::RelatedModelType`].
    pub fn set_related_model(&self, source: impl Into<RelatedSource>) -> Result<()> {
        let model = source.into().into_model()?;
        self.inner.state.borrow_mut().related_model = Some(Rc::downgrade(&model));
        self.rebind();
        self.notify("related_model", Value::Bool(true), Value::Null, SetMeta::default());
        Ok(())
    }

    /// Detach from the related model, if any.
    pub fn clear_related_model(&self) {
        let had = self.inner.state.borrow_mut().related_model.take().is_some();
        self.rebind();
        if had {
            self.notify("related_model", Value::Bool(false), Value::Bool(true), SetMeta::default());
        }
    }

    /// Listen for changes to `attribute`, or to every attribute when `None`.
    pub fn on_change(
        &self,
        attribute: Option<&str>,
        listener: impl Fn(&ChangeEvent) + 'static,
    ) -> Subscription {
        self.inner.listeners.subscribe(attribute, listener)
    }

    /// No validation error is outstanding.
    pub fn is_valid(&self) -> bool {
        self.error().is_none()
    }

    pub fn value(&self) -> Value {
        self.get("value").unwrap_or(Value::Null)
    }

    pub fn label(&self) -> Option<String> {
        self.string_attribute("label")
    }

    pub fn name(&self) -> Option<String> {
        self.string_attribute("name")
    }

    pub fn class_name(&self) -> Option<String> {
        self.string_attribute("className")
    }

    pub fn error(&self) -> Option<String> {
        self.string_attribute("error")
    }

    pub fn related_key(&self) -> Option<String> {
        self.string_attribute("related_key")
    }

    pub fn disabled(&self) -> bool {
        self.bool_attribute("disabled").unwrap_or(false)
    }

    pub fn show_label_before(&self) -> Option<bool> {
        self.bool_attribute("show_label_before")
    }

    pub fn show_label_after(&self) -> Option<bool> {
        self.bool_attribute("show_label_after")
    }

    pub fn show_error(&self) -> Option<bool> {
        self.bool_attribute("show_error")
    }

    /// Whether a radio is checked. `None` for other types.
    pub fn checked(&self) -> Option<bool> {
        self.bool_attribute("checked")
    }

    /// The option list of a select.
    pub fn options(&self) -> Option<OptionList> {
        match &self.inner.state.borrow().children {
            Children::Options(options) => Some(options.clone()),
            _ => None,
        }
    }

    /// The radio children of a radioset.
    pub fn children(&self) -> Option<ElementList> {
        match &self.inner.state.borrow().children {
            Children::Elements(elements) => Some(elements.clone()),
            _ => None,
        }
    }

    /// The input part of a buttonfield.
    pub fn input(&self) -> Option<Element> {
        self.inner.state.borrow().input.clone()
    }

    /// The button part of a buttonfield.
    pub fn button(&self) -> Option<Element> {
        self.inner.state.borrow().button.clone()
    }

    /// The related model, while it is still alive.
    pub fn related_model(&self) -> Option<Rc<dyn RelatedModel>> {
        self.inner
            .state
            .borrow()
            .related_model
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Store an attribute and notify, unless it already holds `value`.
    ///
    /// Returns whether anything changed.
    pub(crate) fn write_attribute(&self, attribute: &str, value: Value, meta: SetMeta) -> bool {
        let Some(previous) = self.store(attribute, &value) else {
            return false;
        };
        self.after_write(attribute);
        self.notify(attribute, value, previous, meta);
        true
    }

    /// Returns the previous value when the attribute changed.
    fn store(&self, attribute: &str, value: &Value) -> Option<Value> {
        let mut state = self.inner.state.borrow_mut();
        let previous = state
            .attributes
            .get(attribute)
            .cloned()
            .unwrap_or(Value::Null);
        if state.attributes.contains_key(attribute) && previous == *value {
            return None;
        }
        state
            .attributes
            .insert(attribute.to_string(), value.clone());
        Some(previous)
    }

    fn after_write(&self, attribute: &str) {
        match attribute {
            "value" => self.sync_children(),
            "related_key" => self.rebind(),
            _ => {}
        }
    }

    fn notify(&self, attribute: &str, value: Value, previous: Value, meta: SetMeta) {
        if meta.silent {
            return;
        }
        trace!(element = %self.id(), attribute, origin = ?meta.origin, "attribute changed");
        self.inner.listeners.emit(
            attribute,
            &ChangeEvent {
                attribute: attribute.to_string(),
                value,
                previous,
                meta,
            },
        );
    }

    /// Re-derive selection state after the value changed.
    fn sync_children(&self) {
        let value = self.value();
        let elements = {
            let mut state = self.inner.state.borrow_mut();
            match &mut state.children {
                Children::None => return,
                Children::Options(options) => {
                    options.select(&value);
                    return;
                }
                Children::Elements(elements) => elements.clone(),
            }
        };
        elements.check(&value);
    }

    fn string_attribute(&self, attribute: &str) -> Option<String> {
        self.inner
            .state
            .borrow()
            .attributes
            .get(attribute)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn bool_attribute(&self, attribute: &str) -> Option<bool> {
        self.inner
            .state
            .borrow()
            .attributes
            .get(attribute)
            .and_then(Value::as_bool)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id())
            .field("type", &self.field_type())
            .field("value", &self.value())
            .finish()
    }
}

/// Caller attributes merged over the resolved defaults.
fn initial_attributes(resolved: &ResolvedType, options: &ElementOptions) -> IndexMap<String, Value> {
    let defaults = resolved.defaults;
    let tri_state = |explicit: Option<bool>, default: Option<bool>| {
        explicit.or(default).map(Value::Bool).unwrap_or(Value::Null)
    };

    let mut attributes = IndexMap::new();
    attributes.insert(
        "type".to_string(),
        Value::String(resolved.field_type.as_str().to_string()),
    );
    attributes.insert(
        "value".to_string(),
        options
            .value
            .clone()
            .or_else(|| defaults.value.to_value())
            .unwrap_or(Value::Null),
    );
    if let Some(label) = options.label.as_deref().or(defaults.label) {
        attributes.insert("label".to_string(), Value::String(label.to_string()));
    }
    attributes.insert(
        "show_label_before".to_string(),
        tri_state(options.show_label_before, defaults.show_label_before),
    );
    attributes.insert(
        "show_label_after".to_string(),
        tri_state(options.show_label_after, defaults.show_label_after),
    );
    attributes.insert(
        "show_error".to_string(),
        tri_state(options.show_error, defaults.show_error),
    );
    if resolved.field_type == FieldType::Radio {
        attributes.insert("checked".to_string(), Value::Bool(false));
    }
    attributes.insert("error".to_string(), Value::Null);

    let passthrough = [
        ("name", options.name.clone().map(Value::String)),
        ("className", options.class_name.clone().map(Value::String)),
        ("disabled", options.disabled.map(Value::Bool)),
        ("related_key", options.related_key.clone().map(Value::String)),
    ];
    for (key, value) in passthrough {
        if let Some(value) = value {
            attributes.insert(key.to_string(), value);
        }
    }

    for (key, value) in &options.extra {
        if RESERVED.contains(&key.as_str()) || attributes.contains_key(key) {
            debug!(attribute = %key, "ignoring reserved option");
            continue;
        }
        attributes.insert(key.clone(), value.clone());
    }
    attributes
}

/// Build radioset children from any values source.
fn build_elements(
    registry: &TypeRegistry,
    source: Option<ValuesSource>,
    parent: ElementId,
    current: &Value,
) -> Result<ElementList> {
    match source {
        Some(ValuesSource::Elements(list)) => {
            ElementList::adopt(list.iter().cloned().collect(), parent, current)
        }
        Some(other) => ElementList::build(registry, &other.choices(), parent, current),
        None => Ok(ElementList::default()),
    }
}

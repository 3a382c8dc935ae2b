//! Related-model binding: hydration, propagation both ways, validation surfacing

use std::cell::RefCell;
use std::rc::Rc;

use formkit_element::{
    Element, ElementOptions, Model, Origin, RelatedListener, RelatedModel, Subscription,
    ValidationError,
};
use serde_json::{json, Value};
use tracing_test::traced_test;

const REJECTED: &str = "Error message from related model.";

fn model() -> Rc<Model> {
    Rc::new(
        Model::new()
            .with("foo", "bar")
            .with_validator("foo", |value| {
                (value == "invalid").then(|| REJECTED.to_string())
            }),
    )
}

fn bind(model: &Rc<Model>, field_type: &str) -> Element {
    Element::new(
        ElementOptions::new(field_type)
            .related_model(Rc::clone(model))
            .related_key("foo"),
    )
    .unwrap()
}

#[test]
fn round_trip() {
    let model = model();
    let element = bind(&model, "text");

    // hydrated on construction
    assert_eq!(element.value(), json!("bar"));

    model.set("foo", json!("from model")).unwrap();
    assert_eq!(element.value(), json!("from model"));

    element.set("value", "from element").unwrap();
    assert_eq!(model.get("foo"), Some(json!("from element")));
    assert!(element.is_valid());
}

#[test]
fn rejected_write_surfaces_error() {
    let model = model();
    let element = bind(&model, "text");

    element.set("value", "invalid").unwrap();
    assert_eq!(model.get("foo"), Some(json!("bar")));
    assert_eq!(element.error().as_deref(), Some(REJECTED));
    assert!(!element.is_valid());

    element.set("value", "fixed").unwrap();
    assert_eq!(model.get("foo"), Some(json!("fixed")));
    assert!(element.is_valid());
}

#[test]
fn related_changes_are_tagged() {
    let model = model();
    let element = bind(&model, "text");
    let origins = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&origins);
    let _sub = element.on_change(Some("value"), move |e| sink.borrow_mut().push(e.meta.origin));

    model.set("foo", json!("pushed")).unwrap();
    element.set("value", "typed").unwrap();

    assert_eq!(*origins.borrow(), vec![Origin::Related, Origin::Caller]);
}

#[test]
fn rebinding_stops_old_propagation() {
    let old = model();
    let new = Rc::new(Model::new().with("foo", "fresh"));
    let element = bind(&old, "text");

    element.set_related_model(Rc::clone(&new)).unwrap();
    assert_eq!(element.value(), json!("fresh"));

    old.set("foo", json!("stale")).unwrap();
    assert_eq!(element.value(), json!("fresh"));

    element.set("value", "typed").unwrap();
    assert_eq!(old.get("foo"), Some(json!("stale")));
    assert_eq!(new.get("foo"), Some(json!("typed")));
}

#[test]
fn shared_key_does_not_loop() {
    let model = model();
    let first = bind(&model, "text");
    let second = bind(&model, "textarea");

    let writes = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&writes);
    let _sub = model.on_change(Some("foo"), move |_| *sink.borrow_mut() += 1);

    first.set("value", "shared").unwrap();
    assert_eq!(second.value(), json!("shared"));
    assert_eq!(model.get("foo"), Some(json!("shared")));
    assert_eq!(*writes.borrow(), 1);
}

#[test]
fn select_binding_reselects() {
    let model = Rc::new(Model::new().with("plan", "pro"));
    let element = Element::new(
        ElementOptions::new("select")
            .choices([("free", "Free"), ("pro", "Pro")])
            .related_model(Rc::clone(&model))
            .related_key("plan"),
    )
    .unwrap();
    assert_eq!(element.options().unwrap().selected().unwrap().value, "pro");

    model.set("plan", json!("free")).unwrap();
    assert_eq!(element.options().unwrap().selected().unwrap().value, "free");
}

#[traced_test]
#[test]
fn model_without_validation_warns() {
    let model = Rc::new(Model::plain().with("foo", "bar"));
    let element = bind(&model, "text");

    assert!(logs_contain("does not support per-attribute validation"));
    element.set("value", "anything").unwrap();
    assert_eq!(model.get("foo"), Some(json!("anything")));
    assert!(element.is_valid());
}

#[traced_test]
#[test]
fn validating_model_does_not_warn() {
    let model = model();
    let _element = bind(&model, "text");
    assert!(!logs_contain("does not support per-attribute validation"));
}

/// A related model implemented outside the crate.
struct Uppercase {
    values: RefCell<std::collections::HashMap<String, Value>>,
}

impl RelatedModel for Uppercase {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ValidationError> {
        match value.as_str() {
            Some(s) if s.chars().all(|c| !c.is_lowercase()) => {
                self.values.borrow_mut().insert(key.to_string(), value);
                Ok(())
            }
            _ => Err(ValidationError::new(key, "Must be uppercase.")),
        }
    }

    fn subscribe(&self, _key: &str, _listener: RelatedListener) -> Subscription {
        Subscription::detached()
    }

    fn supports_validation(&self) -> bool {
        true
    }
}

#[test]
fn custom_related_model() {
    let model = Rc::new(Uppercase {
        values: RefCell::new([("code".to_string(), json!("ABC"))].into_iter().collect()),
    });
    let element = Element::new(
        ElementOptions::new("text")
            .related_model(Rc::clone(&model))
            .related_key("code"),
    )
    .unwrap();
    assert_eq!(element.value(), json!("ABC"));

    element.set("value", "abc").unwrap();
    assert_eq!(element.error().as_deref(), Some("Must be uppercase."));
    assert_eq!(model.get("code"), Some(json!("ABC")));
}

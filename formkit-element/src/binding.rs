//! Two-way binding between an element's `value` and one key of a related model.
//!
//! A binding is two subscriptions: the model key pushes into the element with
//! [`Origin::Related`], and caller changes to the element's `value` are written
//! through the model's validated setter. Related-origin changes are never
//! written back, and equal-value sets are no-ops on both sides, so any number
//! of elements may share one key without looping.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::element::Element;
use crate::events::{Origin, SetMeta, Subscription};

/// Live listeners linking an element to its related model.
///
/// Dropping the binding detaches both directions.
pub(crate) struct Binding {
    key: String,
    _from_model: Subscription,
    _from_element: Subscription,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding").field("key", &self.key).finish()
    }
}

impl Element {
    /// Drop any existing binding, then bind to the current related model and key.
    ///
    /// An `error` left by the previous binding is cleared. Without a live
    /// model or a non-empty key the element is left unbound. A listener that
    /// rebinds again while this one hydrates supersedes it, and this call
    /// then installs nothing.
    pub(crate) fn rebind(&self) {
        let generation = self.inner.rebinds.get().wrapping_add(1);
        self.inner.rebinds.set(generation);

        let previous = self.inner.binding.borrow_mut().take();
        drop(previous);

        self.write_attribute("error", Value::Null, SetMeta::derived());
        if self.superseded(generation) {
            return;
        }

        let Some(model) = self.related_model() else {
            return;
        };
        let Some(key) = self.related_key().filter(|key| !key.is_empty()) else {
            return;
        };

        if !model.supports_validation() {
            warn!(
                element = %self.id(),
                key = %key,
                "related model does not support per-attribute validation, binding without it"
            );
        }

        match model.get(&key) {
            Some(value) => {
                self.write_attribute("value", value, SetMeta::related());
            }
            None => debug!(element = %self.id(), key = %key, "related model has no value to hydrate"),
        }
        if self.superseded(generation) {
            debug!(element = %self.id(), key = %key, "binding superseded during hydration");
            return;
        }

        let element = Rc::downgrade(&self.inner);
        let from_model = model.subscribe(
            &key,
            Box::new(move |value: &Value| {
                if let Some(inner) = element.upgrade() {
                    let element = Element { inner };
                    trace!(element = %element.id(), "related model pushed value");
                    element.write_attribute("value", value.clone(), SetMeta::related());
                }
            }),
        );

        let related = Rc::downgrade(&model);
        let element = Rc::downgrade(&self.inner);
        let write_key = key.clone();
        let from_element = self.on_change(Some("value"), move |event| {
            if event.meta.origin == Origin::Related {
                return;
            }
            let (Some(model), Some(inner)) = (related.upgrade(), element.upgrade()) else {
                return;
            };
            let element = Element { inner };
            trace!(element = %element.id(), key = %write_key, "writing value to related model");

            let error = match model.set(&write_key, event.value.clone()) {
                Ok(()) => Value::Null,
                Err(rejected) => {
                    debug!(element = %element.id(), key = %write_key, error = %rejected, "related model rejected value");
                    Value::String(rejected.message)
                }
            };
            element.write_attribute("error", error, SetMeta::derived());
        });

        debug!(element = %self.id(), key = %key, "bound to related model");
        *self.inner.binding.borrow_mut() = Some(Binding {
            key,
            _from_model: from_model,
            _from_element: from_element,
        });
    }

    fn superseded(&self, generation: u64) -> bool {
        self.inner.rebinds.get() != generation
    }

    /// Whether the element currently mirrors a related model.
    pub fn is_bound(&self) -> bool {
        self.inner.binding.borrow().is_some()
    }
}

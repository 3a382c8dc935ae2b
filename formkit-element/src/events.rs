//! Change notification with explicitly owned subscriptions.
//!
//! [`Listeners`] is a single-threaded registry of callbacks, each optionally
//! scoped to a topic (an attribute or key name). Subscribing returns a
//! [`Subscription`]; dropping it removes the callback.
//!
//! # Invariants
//!
//! 1. Callbacks run in registration order.
//! 2. No registry borrow is held while a callback runs, so callbacks may
//!    subscribe, unsubscribe or emit again.
//! 3. A subscription disposed during a dispatch is not invoked for the rest
//!    of that dispatch.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;

type Callback<E> = Rc<dyn Fn(&E)>;

struct Slot<E> {
    id: u64,
    topic: Option<String>,
    active: Rc<Cell<bool>>,
    callback: Callback<E>,
}

struct Registry<E> {
    next_id: u64,
    slots: Vec<Slot<E>>,
}

/// A registry of topic-scoped callbacks.
pub struct Listeners<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Register `callback` for `topic`, or for every topic when `None`.
    pub fn subscribe(&self, topic: Option<&str>, callback: impl Fn(&E) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.slots.push(Slot {
                id,
                topic: topic.map(str::to_string),
                active: Rc::clone(&active),
                callback: Rc::new(callback),
            });
            id
        };

        let registry: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                active.set(false);
                if let Some(registry) = registry.upgrade() {
                    registry.borrow_mut().slots.retain(|slot| slot.id != id);
                }
            })),
        }
    }

    /// Invoke every callback registered for `topic` or for all topics.
    pub fn emit(&self, topic: &str, event: &E) {
        let callbacks: Vec<(Rc<Cell<bool>>, Callback<E>)> = self
            .registry
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.topic.as_deref().is_none_or(|t| t == topic))
            .map(|slot| (Rc::clone(&slot.active), Rc::clone(&slot.callback)))
            .collect();

        for (active, callback) in callbacks {
            if active.get() {
                callback(event);
            }
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.registry.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A subscription that is attached to nothing.
    pub fn detached() -> Self {
        Self { detach: None }
    }

    /// Unsubscribe now.
    pub fn dispose(mut self) {
        self.run_detach();
    }

    /// Keep the callback registered for as long as the registry lives.
    pub fn forget(mut self) {
        self.detach = None;
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Where an attribute change came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Origin {
    /// A direct `set` by the element's owner or a view.
    #[default]
    Caller,
    /// Pushed in from the bound related model. Never written back.
    Related,
    /// Computed by the element itself (selection state, binding errors).
    Derived,
}

/// Options accompanying a `set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetMeta {
    pub origin: Origin,
    /// Apply the change without notifying listeners.
    pub silent: bool,
}

impl SetMeta {
    pub fn related() -> Self {
        Self {
            origin: Origin::Related,
            silent: false,
        }
    }

    pub fn derived() -> Self {
        Self {
            origin: Origin::Derived,
            silent: false,
        }
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// An attribute change on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub attribute: String,
    pub value: Value,
    pub previous: Value,
    pub meta: SetMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&String) + Clone + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |e: &String| sink.borrow_mut().push(e.clone()))
    }

    #[test]
    fn topic_scoping() {
        let listeners: Listeners<String> = Listeners::new();
        let (seen, record) = recorder();
        let _value = listeners.subscribe(Some("value"), record.clone());
        let _all = listeners.subscribe(None, record);

        listeners.emit("value", &"v".to_string());
        listeners.emit("label", &"l".to_string());

        assert_eq!(*seen.borrow(), vec!["v", "v", "l"]);
    }

    #[test]
    fn drop_unsubscribes() {
        let listeners: Listeners<String> = Listeners::new();
        let (seen, record) = recorder();
        let sub = listeners.subscribe(Some("value"), record);
        assert_eq!(listeners.len(), 1);

        drop(sub);
        assert!(listeners.is_empty());
        listeners.emit("value", &"v".to_string());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn forget_keeps_callback() {
        let listeners: Listeners<String> = Listeners::new();
        let (seen, record) = recorder();
        listeners.subscribe(None, record).forget();
        listeners.emit("x", &"x".to_string());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn disposed_during_dispatch_is_skipped() {
        let listeners: Listeners<String> = Listeners::new();
        let (seen, record) = recorder();

        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&victim);
        let _killer = listeners.subscribe(None, move |_| {
            slot.borrow_mut().take();
        });
        *victim.borrow_mut() = Some(listeners.subscribe(None, record));

        listeners.emit("value", &"v".to_string());
        assert!(seen.borrow().is_empty());
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn reentrant_emit() {
        let listeners: Rc<Listeners<String>> = Rc::new(Listeners::new());
        let (seen, record) = recorder();
        let inner = Rc::downgrade(&listeners);
        let _relay = listeners.subscribe(Some("outer"), move |_| {
            if let Some(l) = inner.upgrade() {
                l.emit("inner", &"relayed".to_string());
            }
        });
        let _sink = listeners.subscribe(Some("inner"), record);

        listeners.emit("outer", &"start".to_string());
        assert_eq!(*seen.borrow(), vec!["relayed"]);
    }

    #[test]
    fn outliving_the_registry_is_harmless() {
        let listeners: Listeners<String> = Listeners::new();
        let sub = listeners.subscribe(None, |_| {});
        drop(listeners);
        sub.dispose();
    }
}

//! Form element entities with type-driven defaults and related-model binding
//!
//! An [`Element`] is one field of a form. Construction validates its options
//! against the [`formkit_fields`] type registry, merges caller attributes over
//! the type's defaults, derives child collections (select options, radioset
//! children, buttonfield parts) and, when given a related model and key,
//! binds its `value` to that key in both directions.
//!
//! ## Overview
//!
//! - **Closed type set** - unknown types fail construction, nothing half-built is returned
//! - **Two-way binding** - a [`RelatedModel`] key mirrors into `value` and back
//! - **Validation as state** - rejected writes surface in the `error` attribute
//! - **Explicit lifetimes** - listeners are [`Subscription`] handles, dropped to detach
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use formkit_element::{Element, ElementOptions, Model};
//! use serde_json::json;
//!
//! let model = Rc::new(
//!     Model::new()
//!         .with("email", "ada@example.com")
//!         .with_validator("email", |v| {
//!             v.as_str()
//!                 .filter(|s| s.contains('@'))
//!                 .map(|_| None)
//!                 .unwrap_or_else(|| Some("Not an email address.".to_string()))
//!         }),
//! );
//!
//! let email = Element::new(
//!     ElementOptions::new("text")
//!         .label("Email")
//!         .related_model(Rc::clone(&model))
//!         .related_key("email"),
//! )
//! .unwrap();
//! assert_eq!(email.value(), json!("ada@example.com"));
//!
//! email.set("value", "nope").unwrap();
//! assert_eq!(email.error().as_deref(), Some("Not an email address."));
//! assert_eq!(model.get("email"), Some(json!("ada@example.com")));
//! ```
//!
//! Form documents build a whole set of elements from YAML; see [`Form`].

mod binding;
pub mod collections;
pub mod element;
pub mod error;
pub mod events;
pub mod form;
pub mod model;
pub mod options;
pub mod related;

pub use collections::{ElementList, OptionList, SelectOption};
pub use element::{Element, ElementId};
pub use error::{ElementError, Result};
pub use events::{ChangeEvent, Listeners, Origin, SetMeta, Subscription};
pub use form::Form;
pub use model::{Model, ModelChange, Validator};
pub use options::{ElementOptions, ValuesSource};
pub use related::{RelatedListener, RelatedModel, RelatedSource, ValidationError};

pub use formkit_fields::{Choice, ContractVersion, FieldType, RegistryConfig, TypeRegistry};

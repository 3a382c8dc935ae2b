//! Field type registry and construction contracts
//!
//! `formkit-fields` is the schema half of formkit. It knows every field type an
//! element can take and what each type demands of its construction options,
//! but it owns no element state. `formkit-element` builds entities on top of
//! the [`ResolvedType`] this crate hands back.
//!
//! # Architecture
//!
//! - **Closed type set**: [`FieldType`] enumerates every supported type
//! - **One contract per type**: [`TypeContract`] records required options,
//!   default attributes and which child collection the type derives
//! - **Consumer-agnostic options**: validation runs against the [`OptionsView`]
//!   trait, so callers decide how options are stored
//! - **Versioned contract**: [`RegistryConfig`] selects the strict (default) or
//!   legacy defaults

pub mod error;
pub mod registry;
pub mod types;

pub use error::{FieldsError, Result};
pub use registry::{
    contract, ChildKind, ContractVersion, DefaultValue, Defaults, OptionsView, RegistryConfig,
    Requirement, ResolvedType, TypeContract, TypeRegistry,
};
pub use types::{Choice, FieldType, Part};

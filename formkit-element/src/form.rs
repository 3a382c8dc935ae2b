//! Form documents: a named, ordered set of elements read from YAML.

use std::path::Path;

use formkit_fields::{RegistryConfig, TypeRegistry};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::element::Element;
use crate::error::{ElementError, Result};
use crate::options::ElementOptions;
use crate::related::RelatedSource;

#[derive(Debug, Deserialize)]
struct FormDocument {
    #[serde(default)]
    registry: RegistryConfig,
    #[serde(default)]
    elements: IndexMap<String, ElementOptions>,
}

/// Elements built from a form document, keyed in document order.
#[derive(Debug)]
pub struct Form {
    registry: TypeRegistry,
    elements: IndexMap<String, Element>,
}

impl Form {
    /// Build every element of a YAML form document.
    ///
    /// An element without a `name` is named by its key. The first element
    /// that fails to construct fails the whole document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: FormDocument = serde_yaml_ng::from_str(yaml)?;
        let registry = TypeRegistry::new(document.registry);

        let mut elements = IndexMap::with_capacity(document.elements.len());
        for (key, mut options) in document.elements {
            if options.name.is_none() {
                options.name = Some(key.clone());
            }
            let element = Element::build(&registry, options).map_err(|source| {
                ElementError::InForm {
                    name: key.clone(),
                    source: Box::new(source),
                }
            })?;
            elements.insert(key, element);
        }

        debug!(
            elements = elements.len(),
            contract = ?registry.config().contract,
            "loaded form document"
        );
        Ok(Self { registry, elements })
    }

    /// Read and build a form document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&yaml)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Attach `model` to every element that has a `related_key`.
    ///
    /// Returns how many elements were bound.
    pub fn bind(&self, model: impl Into<RelatedSource>) -> Result<usize> {
        let model = model.into().into_model()?;
        let mut bound = 0;
        for element in self.elements.values() {
            if element.related_key().is_some() {
                element.set_related_model(RelatedSource::Model(model.clone()))?;
                bound += 1;
            }
        }
        debug!(bound, "bound form to related model");
        Ok(bound)
    }

    /// No element carries a validation error.
    pub fn is_valid(&self) -> bool {
        self.elements.values().all(Element::is_valid)
    }

    /// Validation messages by element key.
    pub fn errors(&self) -> IndexMap<String, String> {
        self.elements
            .iter()
            .filter_map(|(key, element)| element.error().map(|error| (key.clone(), error)))
            .collect()
    }
}

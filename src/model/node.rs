//! Node in the labeled-property graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Property;
use crate::{Error, Result};

/// A node: a set of labels plus a name-keyed property map.
///
/// Nodes are transient projections of the store's state — value-like, freely
/// clonable, no independent persistence. Identity lives in an ordinary
/// property named `uuid`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    labels: Vec<String>,
    properties: IndexMap<String, Property>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `uuid` property's first value, or `""` when absent.
    pub fn uuid(&self) -> String {
        match self.properties.get("uuid") {
            Some(property) => property.first().to_text(),
            None => String::new(),
        }
    }

    pub fn set_uuid(&mut self, uuid: impl Into<String>) -> Result<()> {
        self.set_property(Property::single("uuid", uuid.into()))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Replace the label set. Empty labels are filtered out.
    pub fn set_labels(&mut self, labels: impl IntoIterator<Item = impl Into<String>>) {
        self.labels = labels
            .into_iter()
            .map(Into::into)
            .filter(|label: &String| !label.is_empty())
            .collect();
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.set_labels(labels);
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Insert a property. The name is the map key, so re-setting a name
    /// replaces the previous property. Empty names are rejected.
    pub fn set_property(&mut self, property: Property) -> Result<()> {
        if property.name().is_empty() {
            return Err(Error::EmptyPropertyName);
        }
        self.properties.insert(property.name().to_owned(), property);
        Ok(())
    }
}

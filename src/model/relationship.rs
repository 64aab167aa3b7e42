//! Relationship (edge) in the labeled-property graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Node, Property};
use crate::{Error, Result};

/// A directed relationship: type, source/target nodes, and properties.
///
/// For update and comparison purposes the endpoints are identified by their
/// `uuid` only. Type and endpoint identity are immutable once the
/// relationship is persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    rel_type: String,
    source: Node,
    target: Node,
    properties: IndexMap<String, Property>,
}

impl Relationship {
    pub fn new(rel_type: impl Into<String>) -> Self {
        Self {
            rel_type: rel_type.into(),
            ..Self::default()
        }
    }

    pub fn rel_type(&self) -> &str {
        &self.rel_type
    }

    pub fn uuid(&self) -> String {
        match self.properties.get("uuid") {
            Some(property) => property.first().to_text(),
            None => String::new(),
        }
    }

    pub fn set_uuid(&mut self, uuid: impl Into<String>) -> Result<()> {
        self.set_property(Property::single("uuid", uuid.into()))
    }

    pub fn source(&self) -> &Node {
        &self.source
    }

    pub fn set_source(&mut self, node: Node) {
        self.source = node;
    }

    pub fn with_source(mut self, node: Node) -> Self {
        self.source = node;
        self
    }

    pub fn target(&self) -> &Node {
        &self.target
    }

    pub fn set_target(&mut self, node: Node) {
        self.target = node;
    }

    pub fn with_target(mut self, node: Node) -> Self {
        self.target = node;
        self
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, property: Property) -> Result<()> {
        if property.name().is_empty() {
            return Err(Error::EmptyPropertyName);
        }
        self.properties.insert(property.name().to_owned(), property);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_identified_by_uuid() {
        let mut source = Node::new();
        source.set_uuid("src-1").unwrap();
        let mut target = Node::new();
        target.set_uuid("dst-1").unwrap();

        let relationship = Relationship::new("KNOWS").with_source(source).with_target(target);
        assert_eq!(relationship.source().uuid(), "src-1");
        assert_eq!(relationship.target().uuid(), "dst-1");
        assert_eq!(relationship.rel_type(), "KNOWS");
    }

    #[test]
    fn test_own_uuid_property() {
        let mut relationship = Relationship::new("KNOWS");
        assert_eq!(relationship.uuid(), "");
        relationship.set_uuid("rel-1").unwrap();
        assert_eq!(relationship.uuid(), "rel-1");
    }
}

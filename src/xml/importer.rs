//! XML → graph model conversion over expanded [`XmlElement`] trees.

use crate::Result;
use crate::model::{Node, Property, Relationship, Scalar, ValueKind};
use crate::xml::XmlElement;

/// Decodes one element subtree at a time; holds no state.
pub struct XmlImporter;

impl XmlImporter {
    /// Decode a `<node>` element. Empty labels and empty-named properties
    /// are skipped.
    pub fn import_node(element: &XmlElement) -> Result<Node> {
        let mut node = Node::new();

        node.set_labels(
            element
                .children_named("label")
                .map(|label| label.text.clone()),
        );

        for child in element.children_named("property") {
            let property = Self::import_property(child);

            if property.name().is_empty() {
                continue;
            }

            node.set_property(property)?;
        }

        Ok(node)
    }

    /// Decode a `<relationship>` element including its nested source and
    /// target nodes.
    pub fn import_relationship(element: &XmlElement) -> Result<Relationship> {
        let rel_type = element
            .children_named("type")
            .last()
            .map(|child| child.text.clone())
            .unwrap_or_default();

        let mut relationship = Relationship::new(rel_type);

        for child in element.children_named("property") {
            let property = Self::import_property(child);

            if property.name().is_empty() {
                continue;
            }

            relationship.set_property(property)?;
        }

        for wrapper in element.children_named("source") {
            for node_element in wrapper.children_named("node") {
                relationship.set_source(Self::import_node(node_element)?);
            }
        }

        for wrapper in element.children_named("target") {
            for node_element in wrapper.children_named("node") {
                relationship.set_target(Self::import_node(node_element)?);
            }
        }

        Ok(relationship)
    }

    /// Decode a `<property>` element: the `key` attribute names it, each
    /// `value` child contributes one coerced value in document order. An
    /// absent or unknown `type` attribute decodes the value as a string.
    pub fn import_property(element: &XmlElement) -> Property {
        let mut property = Property::new(element.attr("key").unwrap_or_default());

        for value in element.children_named("value") {
            let kind = value
                .attr("type")
                .and_then(|name| ValueKind::parse(name).ok())
                .unwrap_or_default();

            property.push(Scalar::coerce(kind, &value.text));
        }

        property
    }
}

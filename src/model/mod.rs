//! The graph data model: typed values, properties, nodes, relationships.
//!
//! These are the DTOs that cross every boundary in the crate — value-like,
//! clonable, no ties to the store.

mod node;
mod property;
mod relationship;
mod value;

pub use node::Node;
pub use property::Property;
pub use relationship::Relationship;
pub use value::{Scalar, ValueKind};

use serde::{Deserialize, Serialize};

/// A node or a relationship — the two entity kinds the interchange format
/// carries. Yielded by the streaming importer and consumed by the import
/// tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphEntity {
    Node(Node),
    Relationship(Relationship),
}

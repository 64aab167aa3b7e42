//! Streaming XML interchange for graph entities.
//!
//! The document shape is a single `<graph>` root holding `node`,
//! `relationship` and `row` elements. The codec guarantees semantic
//! round-trips (labels, property names, kinds, values and value order
//! survive); indentation and attribute order are cosmetic.

pub mod exporter;
pub mod importer;
pub mod reader;

/// Namespace of the `<graph>` root element.
pub const GRAPH_XMLNS: &str = "https://graphport.dev/xmlns";

pub use exporter::XmlExporter;
pub use importer::XmlImporter;
pub use reader::{XmlElement, XmlReader};

//! Graph → XML serialization on top of a streaming writer.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::Result;
use crate::model::{Node, Property, Relationship};
use crate::xml::GRAPH_XMLNS;

/// Streaming exporter: entities are written as they arrive, nothing is
/// buffered beyond the underlying writer.
pub struct XmlExporter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlExporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: Writer::new_with_indent(out, b' ', 2),
        }
    }

    /// XML declaration plus the opening `<graph>` root.
    pub fn start_document(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("graph");
        root.push_attribute(("xmlns", GRAPH_XMLNS));
        self.writer.write_event(Event::Start(root))?;
        Ok(())
    }

    /// Closing `</graph>`.
    pub fn end_document(&mut self) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new("graph")))?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Write one `<node>` element. Extra attributes (such as result-row
    /// coordinates) go on the element itself.
    pub fn export_node(&mut self, node: &Node, attributes: &[(&str, String)]) -> Result<()> {
        let mut start = BytesStart::new("node");
        for (name, value) in attributes {
            start.push_attribute((*name, value.as_str()));
        }
        self.writer.write_event(Event::Start(start))?;

        for label in node.labels() {
            self.text_element("label", label)?;
        }

        for property in node.properties() {
            self.export_property(property)?;
        }

        self.writer.write_event(Event::End(BytesEnd::new("node")))?;
        Ok(())
    }

    /// Write one `<relationship>` element with its full source and target
    /// nodes nested inside.
    pub fn export_relationship(
        &mut self,
        relationship: &Relationship,
        attributes: &[(&str, String)],
    ) -> Result<()> {
        let mut start = BytesStart::new("relationship");
        for (name, value) in attributes {
            start.push_attribute((*name, value.as_str()));
        }
        self.writer.write_event(Event::Start(start))?;

        self.text_element("type", relationship.rel_type())?;

        for property in relationship.properties() {
            self.export_property(property)?;
        }

        self.writer.write_event(Event::Start(BytesStart::new("source")))?;
        self.export_node(relationship.source(), &[])?;
        self.writer.write_event(Event::End(BytesEnd::new("source")))?;

        self.writer.write_event(Event::Start(BytesStart::new("target")))?;
        self.export_node(relationship.target(), &[])?;
        self.writer.write_event(Event::End(BytesEnd::new("target")))?;

        self.writer.write_event(Event::End(BytesEnd::new("relationship")))?;
        Ok(())
    }

    /// One `<value>` child per stored value, kind on the `type` attribute.
    pub fn export_property(&mut self, property: &Property) -> Result<()> {
        let mut start = BytesStart::new("property");
        start.push_attribute(("key", property.name()));
        self.writer.write_event(Event::Start(start))?;

        for value in property.values() {
            let mut value_start = BytesStart::new("value");
            value_start.push_attribute(("type", value.kind().as_str()));
            self.writer.write_event(Event::Start(value_start))?;

            let text = value.to_text();
            self.writer.write_event(Event::Text(BytesText::new(&text)))?;
            self.writer.write_event(Event::End(BytesEnd::new("value")))?;
        }

        self.writer.write_event(Event::End(BytesEnd::new("property")))?;
        Ok(())
    }

    /// Scalar result columns: `<row rowNumber="…">` with one `<record>`
    /// per column.
    pub fn export_row(&mut self, row_number: usize, records: &[(&str, String)]) -> Result<()> {
        let row_number = row_number.to_string();
        let mut start = BytesStart::new("row");
        start.push_attribute(("rowNumber", row_number.as_str()));
        self.writer.write_event(Event::Start(start))?;

        for (column, value) in records {
            let mut record = BytesStart::new("record");
            record.push_attribute(("columnName", *column));
            self.writer.write_event(Event::Start(record))?;
            self.writer.write_event(Event::Text(BytesText::new(value)))?;
            self.writer.write_event(Event::End(BytesEnd::new("record")))?;
        }

        self.writer.write_event(Event::End(BytesEnd::new("row")))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

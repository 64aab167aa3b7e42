//! Forward-only XML cursor yielding graph entities one at a time.
//!
//! The reader never builds a whole-document tree: it advances the
//! underlying parser element by element and expands exactly one top-level
//! subtree into an owned [`XmlElement`] before converting and dropping it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::model::GraphEntity;
use crate::xml::XmlImporter;
use crate::{Error, Result};

// ============================================================================
// XmlElement
// ============================================================================

/// One fully expanded element subtree: tag name, attributes and child
/// elements in document order, plus the concatenated direct text content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First attribute with the given name, if any.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Tag name and attributes of a start tag, no content yet.
fn element_shell(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::named(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());

    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            attribute.unescape_value()?.into_owned(),
        ));
    }

    Ok(element)
}

/// Expand the subtree opened by `start` into an owned tree. The parser is
/// left positioned just past the matching end tag.
fn read_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'static>) -> Result<XmlElement> {
    let mut element = element_shell(start)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(child) => {
                let child_start = child.into_owned();
                element.children.push(read_element(reader, &child_start)?);
            }
            Event::Empty(child) => element.children.push(element_shell(&child)?),
            Event::Text(text) => element.text.push_str(&text.unescape()?),
            Event::CData(data) => element.text.push_str(&String::from_utf8_lossy(&data.into_inner())),
            Event::End(_) => return Ok(element),
            Event::Eof => {
                return Err(Error::Malformed(format!(
                    "unexpected end of document inside <{}>",
                    element.name
                )));
            }
            _ => {}
        }

        buf.clear();
    }
}

// ============================================================================
// XmlReader
// ============================================================================

/// Lazy, non-restartable iterator over the top-level entities of a graph
/// XML document. Top-level elements other than `node` and `relationship`
/// are skipped; a parse error is yielded once, then the iterator ends.
pub struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    in_root: bool,
    done: bool,
}

impl XmlReader<BufReader<File>> {
    /// Open a graph XML file. A missing file fails up front, before any
    /// parsing starts.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::FileNotFound(path.to_owned()));
        }

        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> XmlReader<R> {
    pub fn from_reader(reader: R) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);

        Self {
            reader,
            buf: Vec::new(),
            in_root: false,
            done: false,
        }
    }

    /// Advance to the next `node`/`relationship` subtree and convert it.
    fn advance(&mut self) -> Result<Option<GraphEntity>> {
        loop {
            self.buf.clear();

            let element = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    // The first start tag is the document root; descend.
                    if !self.in_root {
                        self.in_root = true;
                        continue;
                    }

                    let start = start.into_owned();
                    read_element(&mut self.reader, &start)?
                }
                Event::Empty(start) => {
                    if !self.in_root {
                        return Ok(None);
                    }
                    element_shell(&start)?
                }
                Event::Eof => return Ok(None),
                _ => continue,
            };

            match element.name.as_str() {
                "node" => return Ok(Some(GraphEntity::Node(XmlImporter::import_node(&element)?))),
                "relationship" => {
                    return Ok(Some(GraphEntity::Relationship(XmlImporter::import_relationship(
                        &element,
                    )?)));
                }
                _ => continue,
            }
        }
    }
}

impl<R: BufRead> Iterator for XmlReader<R> {
    type Item = Result<GraphEntity>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.advance() {
            Ok(Some(entity)) => Some(Ok(entity)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

//! XML document writing
//!
//! Serializes deterministically: explicit UTF-8 declaration, tab
//! indentation, LF line endings, attributes in the order they sit on each
//! node, and `<tag></tag>` vs `<tag/>` exactly as recorded. A document
//! loaded from this canonical form and saved unmodified is byte-identical.

use std::fs;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::document::document::Document;
use crate::error::Result;
use crate::tree::{Element, Node};

/// Write a document to disk.
///
/// # Errors
/// Returns an error if serialization or file writing fails.
pub fn write_document<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let xml = serialize_document(doc)?;
    fs::write(path, xml)?;
    Ok(())
}

/// Serialize a document to an XML string.
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn serialize_document(doc: &Document) -> Result<String> {
    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b'\t', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    for node in &doc.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &doc.root)?;
    for node in &doc.epilog {
        write_node(&mut writer, node)?;
    }

    let mut xml = String::from_utf8(output)?;
    xml.push('\n');
    Ok(xml)
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    match node {
        Node::Element(el) => write_element(writer, el),
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
            Ok(())
        }
        Node::Comment(comment) => {
            // Comment bodies are stored raw; from_escaped keeps them that way.
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            Ok(())
        }
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(&*el.name);
    for attr in &el.attributes {
        start.push_attribute((&*attr.name, attr.value.as_str()));
    }

    if el.children.is_empty() {
        if el.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            // An empty text event keeps the close tag on the same line.
            writer.write_event(Event::Text(BytesText::from_escaped("")))?;
            writer.write_event(Event::End(BytesEnd::new(&*el.name)))?;
        }
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(&*el.name)))?;
    Ok(())
}

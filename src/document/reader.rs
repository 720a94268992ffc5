//! XML document reading
//!
//! Loads a configuration file into the generic node tree. Whitespace-only
//! text nodes are dropped (the fixed normalization both directions of the
//! round trip agree on); comments and non-blank text are preserved in place.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::document::document::Document;
use crate::error::{Error, Result};
use crate::tree::{Element, NameTable, Node};

/// Read an XML document from disk.
///
/// # Errors
/// Returns [`Error::FileNotFound`] when the file does not exist and
/// [`Error::MalformedDocument`] when it cannot be parsed.
pub fn read_document<P: AsRef<Path>>(path: P, names: &mut NameTable) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    let mut doc = parse_document(&content, names).map_err(|e| Error::MalformedDocument {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    doc.source = Some(path.to_path_buf());
    Ok(doc)
}

/// Parse an XML document from a string.
///
/// # Errors
/// Returns an error if the XML is malformed.
pub fn parse_document(content: &str, names: &mut NameTable) -> Result<Document> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut prolog: Vec<Node> = Vec::new();
    let mut epilog: Vec<Node> = Vec::new();
    let mut root: Option<Element> = None;
    let mut stack: Vec<Element> = Vec::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let element = element_from_tag(&e, names, false)?;
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_tag(&e, names, true)?;
                attach_element(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let completed = stack
                    .pop()
                    .ok_or_else(|| Error::InvalidDocument("unbalanced end tag".to_string()))?;
                attach_element(completed, &mut stack, &mut root)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape()?.into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.append_child(Node::Text(text));
                }
            }
            Ok(Event::Comment(e)) => {
                let comment = Node::Comment(String::from_utf8_lossy(&e).into_owned());
                if let Some(parent) = stack.last_mut() {
                    parent.append_child(comment);
                } else if root.is_none() {
                    prolog.push(comment);
                } else {
                    epilog.push(comment);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declaration, doctype, PI, CDATA are not re-emitted
            Err(e) => return Err(Error::XmlError(e)),
        }
        buf.clear();
    }

    let root = root.ok_or_else(|| Error::InvalidDocument("no root element".to_string()))?;
    Ok(Document {
        prolog,
        root,
        epilog,
        source: None,
    })
}

fn element_from_tag(
    tag: &quick_xml::events::BytesStart<'_>,
    names: &mut NameTable,
    self_closing: bool,
) -> Result<Element> {
    let name = names.intern(&String::from_utf8_lossy(tag.name().as_ref()));
    let mut element = if self_closing {
        Element::new_self_closing(name)
    } else {
        Element::new(name)
    };
    for attr in tag.attributes() {
        let attr = attr?;
        let attr_name = names.intern(&String::from_utf8_lossy(attr.key.as_ref()));
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push(crate::tree::Attribute {
            name: attr_name,
            value,
        });
    }
    Ok(element)
}

fn attach_element(
    element: Element,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.append_child(Node::Element(element));
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(Error::InvalidDocument(
            "more than one root element".to_string(),
        ));
    }
    Ok(())
}

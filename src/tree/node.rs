//! Generic XML node tree
//!
//! One weakly-typed tree serves both the merge layer and the edit layer.
//! Schema knowledge lives in the record mappers, never here.

use std::sync::Arc;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Character data (entity-decoded).
    Text(String),
    /// A comment (without the `<!--`/`-->` delimiters).
    Comment(String),
}

impl Node {
    /// Returns the contained element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable variant of [`Node::as_element`].
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: Arc<str>,
    /// Attribute value (entity-decoded).
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element in the document tree.
///
/// Attribute order and child order are preserved exactly as parsed; both are
/// serialization-relevant. `self_closing` records whether the source wrote
/// `<tag/>` rather than `<tag></tag>` so empty elements round-trip
/// byte-identically. It is a rendering hint only and is ignored by equality.
#[derive(Debug, Clone, Eq)]
pub struct Element {
    /// Element name.
    pub name: Arc<str>,
    /// Ordered attributes.
    pub attributes: Vec<Attribute>,
    /// Ordered children.
    pub children: Vec<Node>,
    /// Whether an empty element serializes as `<tag/>` instead of
    /// `<tag></tag>`.
    pub self_closing: bool,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.children == other.children
    }
}

impl Element {
    /// Creates an empty element that serializes as `<name></name>`.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Creates an empty element that serializes as `<name/>`.
    #[must_use]
    pub fn new_self_closing(name: impl Into<Arc<str>>) -> Self {
        Element {
            self_closing: true,
            ..Element::new(name)
        }
    }

    /// Returns the value of the named attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &*a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether the named attribute is present (possibly empty).
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| &*a.name == name)
    }

    /// Sets an attribute, overwriting in place if present (preserving its
    /// position) and appending otherwise.
    pub fn set_attribute(&mut self, name: impl Into<Arc<str>>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attributes.push(Attribute { name, value });
        }
    }

    /// Removes the named attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| &*a.name != name);
        self.attributes.len() != before
    }

    /// Iterates over direct element children.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Mutable variant of [`Element::child_elements`].
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Returns the first direct child element with the given name.
    #[must_use]
    pub fn child_element(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| &*el.name == name)
    }

    /// Mutable variant of [`Element::child_element`].
    pub fn child_element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|el| &*el.name == name)
    }

    /// Concatenated direct text content.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }

    /// Replaces all direct text children with a single text node. An empty
    /// value removes the text entirely.
    pub fn set_text(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.children.retain(|c| !matches!(c, Node::Text(_)));
        if !value.is_empty() {
            self.children.push(Node::Text(value));
        }
    }

    /// Appends a child node at the end.
    pub fn append_child(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Inserts a child node at `index`, clamped to the child count.
    pub fn insert_child(&mut self, index: usize, node: Node) {
        let index = index.min(self.children.len());
        self.children.insert(index, node);
    }

    /// Removes the child at `index`. A no-op returning `None` when the index
    /// is out of bounds, so converging edits stay tolerant.
    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Replaces the child at `index`, returning the old node. A no-op
    /// returning `None` when the index is out of bounds.
    pub fn replace_child(&mut self, index: usize, node: Node) -> Option<Node> {
        if index < self.children.len() {
            Some(std::mem::replace(&mut self.children[index], node))
        } else {
            None
        }
    }

    /// Index of the `occurrence`-th child element with the given name, in
    /// the full child list.
    #[must_use]
    pub fn position_of(&self, name: &str, occurrence: usize) -> Option<usize> {
        let mut seen = 0;
        for (i, child) in self.children.iter().enumerate() {
            if let Node::Element(el) = child {
                if &*el.name == name {
                    if seen == occurrence {
                        return Some(i);
                    }
                    seen += 1;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_element(name: &str, attrs: &[(&str, &str)]) -> Element {
        let mut el = Element::new(name);
        for (k, v) in attrs {
            el.set_attribute(*k, *v);
        }
        el
    }

    #[test]
    fn test_set_attribute_preserves_order() {
        let mut el = make_element("widget", &[("name", "a"), ("x", "1")]);
        el.set_attribute("name", "b");
        assert_eq!(el.attribute("name"), Some("b"));
        assert_eq!(&*el.attributes[0].name, "name");
        assert_eq!(&*el.attributes[1].name, "x");
    }

    #[test]
    fn test_remove_attribute() {
        let mut el = make_element("widget", &[("name", "a")]);
        assert!(el.remove_attribute("name"));
        assert!(!el.remove_attribute("name"));
        assert!(!el.has_attribute("name"));
    }

    #[test]
    fn test_text_handling() {
        let mut el = Element::new("item");
        el.set_text("hello");
        assert_eq!(el.text(), "hello");
        el.set_text("");
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_remove_child_out_of_bounds_is_noop() {
        let mut el = Element::new("widgets");
        assert!(el.remove_child(0).is_none());
        el.append_child(Node::Element(Element::new("widget")));
        assert!(el.remove_child(5).is_none());
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_equality_ignores_self_closing() {
        let open = Element::new("tags");
        let closed = Element::new_self_closing("tags");
        assert_eq!(open, closed);
    }

    #[test]
    fn test_position_of_counts_occurrences() {
        let mut el = Element::new("widgets");
        el.append_child(Node::Comment(" first ".to_string()));
        el.append_child(Node::Element(make_element("widget", &[("name", "a")])));
        el.append_child(Node::Element(make_element("widget", &[("name", "b")])));
        assert_eq!(el.position_of("widget", 1), Some(2));
        assert_eq!(el.position_of("widget", 2), None);
    }
}

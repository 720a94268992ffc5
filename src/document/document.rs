//! Document type, element extraction/injection, statistics

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::tree::{Element, Node, NodePath, select_all, select_single, select_single_mut};

/// An in-memory XML configuration document.
///
/// One document owns one tree. Trees are never shared between documents, so
/// callers may edit independent documents on separate threads without any
/// synchronization.
#[derive(Debug, Clone)]
pub struct Document {
    /// Comments appearing before the root element.
    pub prolog: Vec<Node>,
    /// The root element.
    pub root: Element,
    /// Comments appearing after the root element.
    pub epilog: Vec<Node>,
    /// The file this document was loaded from, if any.
    pub source: Option<PathBuf>,
}

impl Document {
    /// Creates a document from a bare root element.
    #[must_use]
    pub fn from_root(root: Element) -> Self {
        Document {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
            source: None,
        }
    }

    /// Selects the first element matching `path`, or `None`.
    #[must_use]
    pub fn select_single(&self, path: &NodePath) -> Option<&Element> {
        select_single(&self.root, path)
    }

    /// Selects all elements matching `path`, in document order.
    #[must_use]
    pub fn select_all(&self, path: &NodePath) -> Vec<&Element> {
        select_all(&self.root, path)
    }

    /// Extracts a deep-copy snapshot of the element at `path` for editing.
    /// The caller may mutate the snapshot freely without touching the live
    /// tree. Returns `None` when the path matches nothing.
    #[must_use]
    pub fn extract_for_editing(&self, path: &NodePath) -> Option<Element> {
        self.select_single(path).cloned()
    }

    /// Replaces the element at `path` wholesale with a deep copy of
    /// `modified`, keeping the target's position among its siblings.
    ///
    /// This is the coarse fallback when no fine-grained patch has been
    /// computed; prefer applying a [`crate::patch::Patch`] when one exists.
    ///
    /// # Errors
    /// Returns [`Error::TargetNotFound`] when `path` resolves to nothing at
    /// apply time.
    pub fn apply_element_changes(&mut self, path: &NodePath, modified: &Element) -> Result<()> {
        let target = select_single_mut(&mut self.root, path).ok_or_else(|| {
            Error::TargetNotFound {
                path: path.to_string(),
            }
        })?;
        *target = modified.clone();
        Ok(())
    }

    /// Whether two documents serialize differently.
    ///
    /// # Errors
    /// Returns an error if either document fails to serialize.
    pub fn has_changes(&self, other: &Document) -> Result<bool> {
        let a = crate::document::writer::serialize_document(self)?;
        let b = crate::document::writer::serialize_document(other)?;
        Ok(a != b)
    }

    /// Node and attribute counts for this document.
    #[must_use]
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        for node in self.prolog.iter().chain(self.epilog.iter()) {
            count_nodes(node, &mut stats);
        }
        count_element(&self.root, &mut stats);
        stats
    }
}

/// Node and attribute counts for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Total node count (elements, text, comments).
    pub total_nodes: usize,
    /// Element node count.
    pub element_nodes: usize,
    /// Text node count.
    pub text_nodes: usize,
    /// Comment node count.
    pub comment_nodes: usize,
    /// Total attribute count across all elements.
    pub total_attributes: usize,
}

impl DocumentStats {
    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} node(s) ({} element(s), {} text, {} comment(s)), {} attribute(s)",
            self.total_nodes,
            self.element_nodes,
            self.text_nodes,
            self.comment_nodes,
            self.total_attributes
        )
    }
}

fn count_nodes(node: &Node, stats: &mut DocumentStats) {
    match node {
        Node::Element(el) => count_element(el, stats),
        Node::Text(_) => {
            stats.total_nodes += 1;
            stats.text_nodes += 1;
        }
        Node::Comment(_) => {
            stats.total_nodes += 1;
            stats.comment_nodes += 1;
        }
    }
}

fn count_element(el: &Element, stats: &mut DocumentStats) {
    stats.total_nodes += 1;
    stats.element_nodes += 1;
    stats.total_attributes += el.attributes.len();
    for child in &el.children {
        count_nodes(child, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::reader::parse_document;
    use crate::tree::NameTable;

    fn make_doc(xml: &str) -> Document {
        let mut names = NameTable::new();
        parse_document(xml, &mut names).unwrap()
    }

    fn path(expr: &str) -> NodePath {
        NodePath::parse(expr).unwrap()
    }

    #[test]
    fn test_extract_is_a_snapshot() {
        let doc = make_doc("<base><widgets><widget name=\"a\"/></widgets></base>");
        let mut snapshot = doc
            .extract_for_editing(&path("/base/widgets/widget[@name='a']"))
            .unwrap();
        snapshot.set_attribute("name", "changed");

        // The live tree is untouched.
        assert!(
            doc.select_single(&path("/base/widgets/widget[@name='a']"))
                .is_some()
        );
    }

    #[test]
    fn test_apply_element_changes_preserves_position() {
        let mut doc =
            make_doc("<base><widget name=\"a\"/><widget name=\"b\"/><widget name=\"c\"/></base>");
        let mut snapshot = doc
            .extract_for_editing(&path("/base/widget[@name='b']"))
            .unwrap();
        snapshot.set_attribute("style", "flat");

        doc.apply_element_changes(&path("/base/widget[@name='b']"), &snapshot)
            .unwrap();

        let second = doc.select_single(&path("/base/widget[1]")).unwrap();
        assert_eq!(second.attribute("name"), Some("b"));
        assert_eq!(second.attribute("style"), Some("flat"));
    }

    #[test]
    fn test_apply_element_changes_missing_target_is_fatal() {
        let mut doc = make_doc("<base/>");
        let err = doc
            .apply_element_changes(&path("/base/widget"), &Element::new("widget"))
            .unwrap_err();
        assert!(matches!(err, Error::TargetNotFound { .. }));
    }

    #[test]
    fn test_stats() {
        let doc = make_doc("<base type=\"x\"><!-- c --><widget name=\"a\"/><name>v</name></base>");
        let stats = doc.stats();
        assert_eq!(stats.element_nodes, 3);
        assert_eq!(stats.comment_nodes, 1);
        assert_eq!(stats.text_nodes, 1);
        assert_eq!(stats.total_attributes, 2);
        assert_eq!(stats.total_nodes, 6);
    }

    #[test]
    fn test_has_changes() {
        let doc = make_doc("<base type=\"a\"/>");
        let mut edited = doc.clone();
        assert!(!doc.has_changes(&edited).unwrap());
        edited.root.set_attribute("type", "b");
        assert!(doc.has_changes(&edited).unwrap());
    }
}

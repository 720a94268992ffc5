//! Patch operations
//!
//! A patch is an ordered list of primitive tree mutations. Order matters:
//! later operations may reference nodes created by earlier ones, and a later
//! write to the same target supersedes an earlier one.

use std::fmt;

use crate::tree::{Element, NodePath};

/// One primitive tree mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOperation {
    /// Set (or remove) an attribute on the element at `path`. `None`
    /// removes the attribute. Last writer wins; re-application is a no-op.
    SetAttribute {
        /// Target element.
        path: NodePath,
        /// Attribute name.
        name: String,
        /// New value, or `None` to remove the attribute.
        value: Option<String>,
    },
    /// Replace the direct text content of the element at `path`.
    SetText {
        /// Target element.
        path: NodePath,
        /// New text content; empty clears the text.
        value: String,
    },
    /// Insert `element` under `parent` at `index` (appended when `None`).
    /// Skipped silently when an identical child already sits at the target,
    /// so re-applying a patch does not duplicate elements.
    InsertElement {
        /// Parent element.
        parent: NodePath,
        /// The element to insert, with its attributes and subtree.
        element: Element,
        /// Position in the parent's child list; append when `None`.
        index: Option<usize>,
    },
    /// Remove the element at `path`. A no-op when already absent.
    RemoveElement {
        /// Target element.
        path: NodePath,
    },
    /// Move the element at `path` under `new_parent` at `index` (appended
    /// when `None`). A no-op when already in place.
    MoveElement {
        /// Current element location.
        path: NodePath,
        /// Destination parent.
        new_parent: NodePath,
        /// Position in the destination child list; append when `None`.
        index: Option<usize>,
    },
    /// Reorder the children of `parent`: `order[i]` is the current index of
    /// the child to place at position `i`. Must be a permutation of the
    /// full child list.
    ReorderChildren {
        /// Parent element.
        parent: NodePath,
        /// Permutation of current child indices.
        order: Vec<usize>,
    },
}

impl fmt::Display for NodeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetAttribute {
                path,
                name,
                value: Some(value),
            } => write!(f, "~ {path} @{name} = '{value}'"),
            Self::SetAttribute {
                path,
                name,
                value: None,
            } => write!(f, "- {path} @{name}"),
            Self::SetText { path, value } => write!(f, "~ {path} text = '{value}'"),
            Self::InsertElement {
                parent,
                element,
                index: Some(index),
            } => write!(f, "+ {parent}/{} at {index}", element.name),
            Self::InsertElement {
                parent,
                element,
                index: None,
            } => write!(f, "+ {parent}/{}", element.name),
            Self::RemoveElement { path } => write!(f, "- {path}"),
            Self::MoveElement {
                path, new_parent, ..
            } => write!(f, "> {path} -> {new_parent}"),
            Self::ReorderChildren { parent, order } => {
                write!(f, "~ {parent} reorder {order:?}")
            }
        }
    }
}

/// An ordered sequence of node operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    /// Operations, applied strictly in order.
    pub operations: Vec<NodeOperation>,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the patch contains no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: NodeOperation) {
        self.operations.push(operation);
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "No changes");
        }
        for op in &self.operations {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = NodePath::parse("/base/widgets/widget[@name='a']").unwrap();
        let set = NodeOperation::SetAttribute {
            path: path.clone(),
            name: "style".to_string(),
            value: Some("flat".to_string()),
        };
        assert_eq!(
            set.to_string(),
            "~ /base/widgets/widget[@name='a'] @style = 'flat'"
        );

        let remove = NodeOperation::SetAttribute {
            path,
            name: "style".to_string(),
            value: None,
        };
        assert_eq!(
            remove.to_string(),
            "- /base/widgets/widget[@name='a'] @style"
        );
    }
}

//! Patch application
//!
//! Operations execute strictly in list order. An operation whose assumed
//! target is missing (for example, set-attribute on a node a previous
//! operation in the same batch removed) is logged and skipped: a patch is
//! not atomic, because later UI actions may intentionally supersede earlier
//! ones in the same session.

use crate::document::Document;
use crate::patch::op::{NodeOperation, Patch};
use crate::tree::{
    Element, Node, NodePath, child_matching_index, select_single, select_single_mut,
};

/// Counts from one patch application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Operations that took effect (including designed no-ops such as
    /// removing an already-absent element).
    pub applied: usize,
    /// Operations skipped because their target was missing.
    pub skipped: usize,
}

impl ApplyOutcome {
    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.skipped == 0 {
            format!("{} operation(s) applied", self.applied)
        } else {
            format!(
                "{} operation(s) applied, {} skipped",
                self.applied, self.skipped
            )
        }
    }
}

impl Patch {
    /// Applies this patch to a document. See [`apply`].
    pub fn apply_to(&self, document: &mut Document) -> ApplyOutcome {
        apply(self, document)
    }
}

/// Applies every operation of `patch` to `document`, in order.
pub fn apply(patch: &Patch, document: &mut Document) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    for op in &patch.operations {
        if apply_operation(&mut document.root, op) {
            outcome.applied += 1;
        } else {
            tracing::warn!("Skipped patch operation with missing target: {op}");
            outcome.skipped += 1;
        }
    }
    tracing::debug!("Patch applied: {}", outcome.summary());
    outcome
}

fn apply_operation(root: &mut Element, op: &NodeOperation) -> bool {
    match op {
        NodeOperation::SetAttribute { path, name, value } => {
            let Some(el) = select_single_mut(root, path) else {
                return false;
            };
            match value {
                Some(value) => el.set_attribute(name.as_str(), value.clone()),
                None => {
                    el.remove_attribute(name);
                }
            }
            true
        }

        NodeOperation::SetText { path, value } => {
            let Some(el) = select_single_mut(root, path) else {
                return false;
            };
            el.set_text(value.clone());
            true
        }

        NodeOperation::InsertElement {
            parent,
            element,
            index,
        } => {
            let Some(parent_el) = select_single_mut(root, parent) else {
                return false;
            };
            // Re-application guard: an identical child means this insert
            // already happened.
            if parent_el
                .child_elements()
                .any(|existing| existing == element)
            {
                return true;
            }
            match index {
                Some(index) => parent_el.insert_child(*index, Node::Element(element.clone())),
                None => parent_el.append_child(Node::Element(element.clone())),
            }
            true
        }

        NodeOperation::RemoveElement { path } => {
            let Some((parent_path, last)) = path.split_last() else {
                // The root element cannot be removed.
                return false;
            };
            // An absent parent or child means the element is already gone,
            // which is the desired end state.
            if let Some(parent_el) = select_single_mut(root, &parent_path) {
                if let Some(index) = child_matching_index(parent_el, last) {
                    parent_el.remove_child(index);
                }
            }
            true
        }

        NodeOperation::MoveElement {
            path,
            new_parent,
            index,
        } => apply_move(root, op, path, new_parent, *index),

        NodeOperation::ReorderChildren { parent, order } => {
            let Some(parent_el) = select_single_mut(root, parent) else {
                return false;
            };
            if !is_permutation(order, parent_el.children.len()) {
                return false;
            }
            let mut slots: Vec<Option<Node>> =
                parent_el.children.drain(..).map(Some).collect();
            parent_el.children = order.iter().filter_map(|&i| slots[i].take()).collect();
            true
        }
    }
}

fn apply_move(
    root: &mut Element,
    op: &NodeOperation,
    path: &NodePath,
    new_parent: &NodePath,
    index: Option<usize>,
) -> bool {
    let Some((source_parent, last)) = path.split_last() else {
        return false;
    };
    if select_single(root, new_parent).is_none() {
        return false;
    }

    let (node, source_index) = {
        let Some(parent_el) = select_single_mut(root, &source_parent) else {
            return false;
        };
        let Some(child_index) = child_matching_index(parent_el, last) else {
            return false;
        };
        // Already at the destination: nothing to do.
        if source_parent == *new_parent {
            let at_end = child_index == parent_el.children.len() - 1;
            if index == Some(child_index) || (index.is_none() && at_end) {
                return true;
            }
        }
        match parent_el.remove_child(child_index) {
            Some(node) => (node, child_index),
            None => return false,
        }
    };

    if let Some(dest) = select_single_mut(root, new_parent) {
        match index {
            Some(index) => dest.insert_child(index, node),
            None => dest.append_child(node),
        }
        true
    } else {
        // The destination sat inside the moved subtree; undo the removal.
        tracing::warn!("Move destination vanished, restoring source: {op}");
        if let Some(parent_el) = select_single_mut(root, &source_parent) {
            parent_el.insert_child(source_index, node);
        }
        false
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in order {
        if i >= len || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

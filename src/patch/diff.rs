//! Collection diffing
//!
//! Repeated children are compared position-wise when the list lengths are
//! equal; otherwise the tail from the first divergent index is replaced with
//! a remove-then-insert run. Reordering detection (LCS-style minimal diffs
//! for middle insertions) is deliberately not attempted.

use crate::patch::op::NodeOperation;
use crate::tree::{Element, NodePath, PathStep, Predicate};

/// Diffs two lists of record items living under `parent` as repeated
/// `item_name` elements.
///
/// Items are addressed by `key_attr` (`item[@key='v']`) when the schema
/// declares one and the key is stable across the edit, falling back to
/// positional `item[i]` selectors. `diff_pair` receives each changed pair
/// with the path addressing it; `to_element` builds elements for inserted
/// items.
///
/// `indexed_inserts` positions inserted items explicitly; pass `false` for
/// containers holding several element kinds, where per-kind indices do not
/// map onto the full child list and appending is the only safe placement.
pub fn diff_items<T, F, G, H>(
    ops: &mut Vec<NodeOperation>,
    parent: &NodePath,
    item_name: &str,
    key_attr: Option<&str>,
    indexed_inserts: bool,
    original: &[T],
    modified: &[T],
    key_of: F,
    to_element: G,
    diff_pair: H,
) where
    T: PartialEq,
    F: Fn(&T) -> Option<String>,
    G: Fn(&T) -> Element,
    H: Fn(&mut Vec<NodeOperation>, &NodePath, &T, &T),
{
    if original.len() == modified.len() {
        for (i, (before, after)) in original.iter().zip(modified).enumerate() {
            if before == after {
                continue;
            }
            let step = pair_step(item_name, key_attr, &key_of, before, after, i);
            let item_path = parent.join_step(step);
            diff_pair(ops, &item_path, before, after);
        }
        return;
    }

    // Diverging lengths: replace the tail from the first differing index.
    let shared = original
        .iter()
        .zip(modified)
        .take_while(|(before, after)| before == after)
        .count();

    for i in (shared..original.len()).rev() {
        let step = item_step(item_name, key_attr, key_of(&original[i]), i);
        ops.push(NodeOperation::RemoveElement {
            path: parent.join_step(step),
        });
    }
    for (offset, item) in modified[shared..].iter().enumerate() {
        ops.push(NodeOperation::InsertElement {
            parent: parent.clone(),
            element: to_element(item),
            index: indexed_inserts.then_some(shared + offset),
        });
    }
}

/// Step addressing a changed item: keyed when the key is stable across the
/// edit, positional otherwise (including when the key itself changed).
fn pair_step<T>(
    item_name: &str,
    key_attr: Option<&str>,
    key_of: impl Fn(&T) -> Option<String>,
    before: &T,
    after: &T,
    index: usize,
) -> PathStep {
    if let (Some(attr), Some(before_key), Some(after_key)) =
        (key_attr, key_of(before), key_of(after))
    {
        if before_key == after_key {
            return PathStep {
                name: item_name.to_string(),
                predicate: Some(Predicate::AttributeEquals(attr.to_string(), before_key)),
            };
        }
    }
    PathStep {
        name: item_name.to_string(),
        predicate: Some(Predicate::Index(index)),
    }
}

/// Step addressing an item on one side only (removals).
fn item_step(item_name: &str, key_attr: Option<&str>, key: Option<String>, index: usize) -> PathStep {
    match (key_attr, key) {
        (Some(attr), Some(key)) => PathStep {
            name: item_name.to_string(),
            predicate: Some(Predicate::AttributeEquals(attr.to_string(), key)),
        },
        _ => PathStep {
            name: item_name.to_string(),
            predicate: Some(Predicate::Index(index)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::op::NodeOperation;

    #[derive(Clone, PartialEq)]
    struct Item {
        name: String,
        value: String,
    }

    fn item(name: &str, value: &str) -> Item {
        Item {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn run_diff(original: &[Item], modified: &[Item]) -> Vec<NodeOperation> {
        let mut ops = Vec::new();
        let parent = NodePath::parse("/base/items").unwrap();
        diff_items(
            &mut ops,
            &parent,
            "item",
            Some("name"),
            true,
            original,
            modified,
            |i: &Item| Some(i.name.clone()),
            |i: &Item| {
                let mut el = Element::new_self_closing("item");
                el.set_attribute("name", i.name.clone());
                el.set_attribute("value", i.value.clone());
                el
            },
            |ops, path, _before, after| {
                ops.push(NodeOperation::SetAttribute {
                    path: path.clone(),
                    name: "value".to_string(),
                    value: Some(after.value.clone()),
                });
            },
        );
        ops
    }

    #[test]
    fn test_equal_lists_produce_no_ops() {
        let items = vec![item("a", "1"), item("b", "2")];
        assert!(run_diff(&items, &items.clone()).is_empty());
    }

    #[test]
    fn test_changed_item_addressed_by_key() {
        let ops = run_diff(
            &[item("a", "1"), item("b", "2")],
            &[item("a", "1"), item("b", "9")],
        );
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            NodeOperation::SetAttribute { path, .. } => {
                assert_eq!(path.to_string(), "/base/items/item[@name='b']");
            }
            other => panic!("unexpected op: {other}"),
        }
    }

    #[test]
    fn test_appended_item_becomes_insert() {
        let ops = run_diff(&[item("a", "1")], &[item("a", "1"), item("b", "2")]);
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            NodeOperation::InsertElement { index: Some(1), .. }
        ));
    }

    #[test]
    fn test_shortened_list_becomes_removals() {
        let ops = run_diff(&[item("a", "1"), item("b", "2")], &[item("a", "1")]);
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            NodeOperation::RemoveElement { path } => {
                assert_eq!(path.to_string(), "/base/items/item[@name='b']");
            }
            other => panic!("unexpected op: {other}"),
        }
    }

    #[test]
    fn test_middle_insertion_replaces_tail() {
        // Known limitation: inserting in the middle rewrites the tail
        // rather than producing a single insert.
        let ops = run_diff(
            &[item("a", "1"), item("c", "3")],
            &[item("a", "1"), item("b", "2"), item("c", "3")],
        );
        let removes = ops
            .iter()
            .filter(|op| matches!(op, NodeOperation::RemoveElement { .. }))
            .count();
        let inserts = ops
            .iter()
            .filter(|op| matches!(op, NodeOperation::InsertElement { .. }))
            .count();
        assert_eq!((removes, inserts), (1, 2));
    }
}

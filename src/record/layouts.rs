//! Layouts schema (editor layout descriptors)
//!
//! Binds the `Layouts/*.xml` family: a `<base>` root with a `<layouts>`
//! container of `<layout>` elements describing how one schema is presented
//! (columns, insertion definitions).
//!
//! Not modeled: the `<treeview_context_menu>` and `<items>` sub-trees of a
//! layout, and the `<default_node>` child of an insertion definition. Whole
//! layouts rebuilt through [`RecordMapper::to_element`] drop them; edits to
//! layout records must therefore flow through the patch path, which touches
//! only the nodes implicated by the diff and leaves unmodeled sub-trees in
//! place.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::patch::{NodeOperation, Patch, diff_items};
use crate::record::mapper::{
    FieldSpec, RecordMapper, check_root, diff_fields, emit_attributes, read_fields,
};
use crate::record::presence::Presence;
use crate::record::validate::ValidationResult;
use crate::tree::{Element, Node, NodePath};

/// Edit record for one merged layouts document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutsRecord {
    /// The root `type` attribute.
    #[serde(rename = "type")]
    pub kind: Presence<String>,
    /// The `layouts` container.
    pub layouts: Presence<Vec<LayoutRecord>>,
}

/// One `<layout>` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Layout `class` attribute (the merge/diff key).
    pub class: Presence<String>,
    pub version: Presence<String>,
    pub xml_tag: Presence<String>,
    pub name_attribute: Presence<String>,
    pub use_in_treeview: Presence<String>,
    /// The optional `<columns>` container.
    pub columns: Presence<Vec<ColumnRecord>>,
    /// The optional `<insertion_definitions>` container.
    pub insertion_definitions: Presence<Vec<InsertionDefinitionRecord>>,
}

/// One `<column>` of a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    /// Column `id` attribute (the diff key).
    pub id: Presence<String>,
    pub width: Presence<String>,
}

/// One `<insertion_definition>` of a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertionDefinitionRecord {
    /// Definition `label` attribute (the diff key).
    pub label: Presence<String>,
    pub xml_path: Presence<String>,
}

static ROOT_FIELDS: &[FieldSpec<LayoutsRecord>] = &[FieldSpec {
    attr: "type",
    get: |r| &r.kind,
    get_mut: |r| &mut r.kind,
}];

static LAYOUT_FIELDS: &[FieldSpec<LayoutRecord>] = &[
    FieldSpec { attr: "class", get: |l| &l.class, get_mut: |l| &mut l.class },
    FieldSpec { attr: "version", get: |l| &l.version, get_mut: |l| &mut l.version },
    FieldSpec { attr: "xml_tag", get: |l| &l.xml_tag, get_mut: |l| &mut l.xml_tag },
    FieldSpec { attr: "name_attribute", get: |l| &l.name_attribute, get_mut: |l| &mut l.name_attribute },
    FieldSpec { attr: "use_in_treeview", get: |l| &l.use_in_treeview, get_mut: |l| &mut l.use_in_treeview },
];

static COLUMN_FIELDS: &[FieldSpec<ColumnRecord>] = &[
    FieldSpec { attr: "id", get: |c| &c.id, get_mut: |c| &mut c.id },
    FieldSpec { attr: "width", get: |c| &c.width, get_mut: |c| &mut c.width },
];

static INSERTION_FIELDS: &[FieldSpec<InsertionDefinitionRecord>] = &[
    FieldSpec { attr: "label", get: |d| &d.label, get_mut: |d| &mut d.label },
    FieldSpec { attr: "xml_path", get: |d| &d.xml_path, get_mut: |d| &mut d.xml_path },
];

/// Mapper between layouts elements and [`LayoutsRecord`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutsMapper;

impl RecordMapper for LayoutsMapper {
    type Record = LayoutsRecord;

    fn root_name(&self) -> &'static str {
        "base"
    }

    fn from_element(&self, element: &Element) -> Result<LayoutsRecord> {
        check_root(element, "base")?;
        let mut record = LayoutsRecord::default();
        read_fields(&mut record, element, ROOT_FIELDS);
        record.layouts = match element.child_element("layouts") {
            None => Presence::Absent,
            Some(container) => Presence::from_items(
                container
                    .child_elements()
                    .filter(|el| &*el.name == "layout")
                    .map(layout_from_element)
                    .collect(),
            ),
        };
        Ok(record)
    }

    fn to_element_with_original(
        &self,
        record: &LayoutsRecord,
        original: Option<&Element>,
    ) -> Element {
        let mut element = Element::new("base");
        emit_attributes(&mut element, record, ROOT_FIELDS, original);
        if record.layouts.is_present() {
            let original_container = original.and_then(|el| el.child_element("layouts"));
            let mut container = Element::new("layouts");
            if let Some(original_container) = original_container {
                container.self_closing = original_container.self_closing;
            }
            for (i, layout) in record.layouts.items().iter().enumerate() {
                let original_item = original_container.and_then(|c| {
                    c.child_elements().filter(|el| &*el.name == "layout").nth(i)
                });
                container.append_child(Node::Element(layout_to_element(layout, original_item)));
            }
            element.append_child(Node::Element(container));
        }
        element
    }

    fn generate_patch(&self, original: &LayoutsRecord, modified: &LayoutsRecord) -> Patch {
        let mut ops = Vec::new();
        let root = NodePath::root("base");
        diff_fields(&mut ops, &root, original, modified, ROOT_FIELDS);

        match (original.layouts.is_absent(), modified.layouts.is_absent()) {
            (true, true) => {}
            (true, false) => {
                let rebuilt = self.to_element(modified);
                let container = rebuilt
                    .child_element("layouts")
                    .cloned()
                    .unwrap_or_else(|| Element::new("layouts"));
                ops.push(NodeOperation::InsertElement {
                    parent: root,
                    element: container,
                    index: None,
                });
            }
            (false, true) => ops.push(NodeOperation::RemoveElement {
                path: root.join("layouts"),
            }),
            (false, false) => {
                let container_path = root.join("layouts");
                diff_items(
                    &mut ops,
                    &container_path,
                    "layout",
                    Some("class"),
                    true,
                    original.layouts.items(),
                    modified.layouts.items(),
                    |l: &LayoutRecord| l.class.value().cloned(),
                    |l: &LayoutRecord| layout_to_element(l, None),
                    |ops, path, before, after| diff_layout_pair(ops, path, before, after),
                );
            }
        }
        Patch { operations: ops }
    }

    fn validate(&self, record: &LayoutsRecord) -> ValidationResult {
        let mut result = ValidationResult::new();
        if record.kind.value().is_none() {
            result.add_warning("type attribute is empty");
        }

        let layouts = record.layouts.items();
        let mut seen: HashSet<&str> = HashSet::new();
        for layout in layouts {
            if let Some(class) = layout.class.value() {
                if !seen.insert(class.as_str()) {
                    result.add_error(format!("duplicate layout class '{class}'"));
                }
            }
        }
        for (i, layout) in layouts.iter().enumerate() {
            let mut child = ValidationResult::new();
            if layout.class.value().is_none() {
                child.add_warning("class is empty");
            }
            if layout.xml_tag.value().is_none() {
                child.add_warning("xml_tag is empty");
            }
            let mut column_ids: HashSet<&str> = HashSet::new();
            for column in layout.columns.items() {
                if let Some(id) = column.id.value() {
                    if !column_ids.insert(id.as_str()) {
                        child.add_error(format!("duplicate column id '{id}'"));
                    }
                }
            }
            result.absorb(&format!("layout[{i}]"), child);
        }
        result
    }
}

fn layout_from_element(element: &Element) -> LayoutRecord {
    let mut layout = LayoutRecord::default();
    read_fields(&mut layout, element, LAYOUT_FIELDS);
    layout.columns = list_from(element, "columns", "column", |el| {
        let mut column = ColumnRecord::default();
        read_fields(&mut column, el, COLUMN_FIELDS);
        column
    });
    layout.insertion_definitions =
        list_from(element, "insertion_definitions", "insertion_definition", |el| {
            let mut definition = InsertionDefinitionRecord::default();
            read_fields(&mut definition, el, INSERTION_FIELDS);
            definition
        });
    layout
}

fn list_from<T>(
    parent: &Element,
    container_name: &str,
    item_name: &str,
    item_from: impl Fn(&Element) -> T,
) -> Presence<Vec<T>> {
    match parent.child_element(container_name) {
        None => Presence::Absent,
        Some(container) => Presence::from_items(
            container
                .child_elements()
                .filter(|el| &*el.name == item_name)
                .map(item_from)
                .collect(),
        ),
    }
}

fn layout_to_element(layout: &LayoutRecord, original: Option<&Element>) -> Element {
    let mut element = Element::new("layout");
    emit_attributes(&mut element, layout, LAYOUT_FIELDS, original);
    emit_list(
        &mut element,
        "columns",
        "column",
        &layout.columns,
        original,
        |column, item_original| item_to_element(column, "column", COLUMN_FIELDS, item_original),
    );
    emit_list(
        &mut element,
        "insertion_definitions",
        "insertion_definition",
        &layout.insertion_definitions,
        original,
        |definition, item_original| {
            item_to_element(
                definition,
                "insertion_definition",
                INSERTION_FIELDS,
                item_original,
            )
        },
    );
    element.self_closing = match original {
        Some(original) => original.self_closing,
        None => element.children.is_empty(),
    };
    element
}

fn emit_list<T>(
    parent: &mut Element,
    container_name: &str,
    item_name: &str,
    items: &Presence<Vec<T>>,
    original_parent: Option<&Element>,
    item_to: impl Fn(&T, Option<&Element>) -> Element,
) {
    if items.is_absent() {
        return;
    }
    let original = original_parent.and_then(|el| el.child_element(container_name));
    let mut container = Element::new(container_name);
    if let Some(original) = original {
        container.self_closing = original.self_closing;
    }
    for (i, item) in items.items().iter().enumerate() {
        let original_item = original.and_then(|c| {
            c.child_elements().filter(|el| &*el.name == item_name).nth(i)
        });
        container.append_child(Node::Element(item_to(item, original_item)));
    }
    parent.append_child(Node::Element(container));
}

fn item_to_element<T>(
    item: &T,
    name: &str,
    fields: &[FieldSpec<T>],
    original: Option<&Element>,
) -> Element {
    let mut element = Element::new_self_closing(name);
    emit_attributes(&mut element, item, fields, original);
    if let Some(original) = original {
        element.self_closing = original.self_closing;
    }
    element
}

fn diff_layout_pair(
    ops: &mut Vec<NodeOperation>,
    path: &NodePath,
    before: &LayoutRecord,
    after: &LayoutRecord,
) {
    diff_fields(ops, path, before, after, LAYOUT_FIELDS);
    diff_list(
        ops,
        path,
        "columns",
        "column",
        Some("id"),
        &before.columns,
        &after.columns,
        |c: &ColumnRecord| c.id.value().cloned(),
        |c: &ColumnRecord| item_to_element(c, "column", COLUMN_FIELDS, None),
        COLUMN_FIELDS,
    );
    diff_list(
        ops,
        path,
        "insertion_definitions",
        "insertion_definition",
        Some("label"),
        &before.insertion_definitions,
        &after.insertion_definitions,
        |d: &InsertionDefinitionRecord| d.label.value().cloned(),
        |d: &InsertionDefinitionRecord| {
            item_to_element(d, "insertion_definition", INSERTION_FIELDS, None)
        },
        INSERTION_FIELDS,
    );
}

fn diff_list<T: PartialEq>(
    ops: &mut Vec<NodeOperation>,
    parent: &NodePath,
    container_name: &str,
    item_name: &str,
    key_attr: Option<&str>,
    original: &Presence<Vec<T>>,
    modified: &Presence<Vec<T>>,
    key_of: impl Fn(&T) -> Option<String>,
    to_element: impl Fn(&T) -> Element,
    fields: &[FieldSpec<T>],
) {
    match (original.is_absent(), modified.is_absent()) {
        (true, true) => {}
        (true, false) => {
            let mut container = Element::new(container_name);
            for item in modified.items() {
                container.append_child(Node::Element(to_element(item)));
            }
            ops.push(NodeOperation::InsertElement {
                parent: parent.clone(),
                element: container,
                index: None,
            });
        }
        (false, true) => ops.push(NodeOperation::RemoveElement {
            path: parent.join(container_name),
        }),
        (false, false) => {
            let container_path = parent.join(container_name);
            diff_items(
                ops,
                &container_path,
                item_name,
                key_attr,
                true,
                original.items(),
                modified.items(),
                key_of,
                to_element,
                |ops, path, before, after| diff_fields(ops, path, before, after, fields),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::tree::NameTable;
    use pretty_assertions::assert_eq;

    fn parse_root(xml: &str) -> Element {
        let mut names = NameTable::new();
        parse_document(xml, &mut names).unwrap().root
    }

    const SAMPLE: &str = r#"<base type="string">
	<layouts>
		<layout class="item_modifier" version="0.1" xml_tag="ItemModifier" name_attribute="name" use_in_treeview="true">
			<columns>
				<column id="name" width="200"/>
				<column id="loot_drop_score" width="120"/>
			</columns>
			<insertion_definitions>
				<insertion_definition label="New modifier" xml_path="ItemModifiers/ItemModifier"/>
			</insertion_definitions>
		</layout>
	</layouts>
</base>"#;

    #[test]
    fn test_round_trip_of_modeled_constructs() {
        let root = parse_root(SAMPLE);
        let record = LayoutsMapper.from_element(&root).unwrap();
        let rebuilt = LayoutsMapper.to_element_with_original(&record, Some(&root));
        assert_eq!(rebuilt, root);
    }

    #[test]
    fn test_unmodeled_subtrees_are_dropped_by_rebuild_only() {
        // treeview_context_menu is documented as unmodeled: the record does
        // not carry it, and a patch from two records never touches it.
        let with_menu = parse_root(
            "<base type=\"string\"><layouts><layout class=\"a\"><treeview_context_menu><item name=\"copy\"/></treeview_context_menu></layout></layouts></base>",
        );
        let record = LayoutsMapper.from_element(&with_menu).unwrap();
        let rebuilt = LayoutsMapper.to_element(&record);
        assert_ne!(rebuilt, with_menu);

        let patch = LayoutsMapper.generate_patch(&record, &record.clone());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_empty_columns_container_round_trips() {
        let root = parse_root(
            "<base><layouts><layout class=\"a\"><columns></columns></layout></layouts></base>",
        );
        let record = LayoutsMapper.from_element(&root).unwrap();
        assert_eq!(record.layouts.items()[0].columns, Presence::PresentEmpty);

        let rebuilt = LayoutsMapper.to_element_with_original(&record, Some(&root));
        assert_eq!(rebuilt, root);
    }

    #[test]
    fn test_column_width_edit_is_one_operation() {
        let original = LayoutsMapper.from_element(&parse_root(SAMPLE)).unwrap();
        let mut modified = original.clone();
        if let Presence::Present(layouts) = &mut modified.layouts {
            if let Presence::Present(columns) = &mut layouts[0].columns {
                columns[1].width = Presence::Present("160".to_string());
            }
        }

        let patch = LayoutsMapper.generate_patch(&original, &modified);
        assert_eq!(patch.len(), 1);
        match &patch.operations[0] {
            NodeOperation::SetAttribute { path, name, value } => {
                assert_eq!(
                    path.to_string(),
                    "/base/layouts/layout[@class='item_modifier']/columns/column[@id='loot_drop_score']"
                );
                assert_eq!(name, "width");
                assert_eq!(value.as_deref(), Some("160"));
            }
            other => panic!("unexpected op: {other}"),
        }
    }

    #[test]
    fn test_added_column_becomes_indexed_insert() {
        let original = LayoutsMapper.from_element(&parse_root(SAMPLE)).unwrap();
        let mut modified = original.clone();
        if let Presence::Present(layouts) = &mut modified.layouts {
            if let Presence::Present(columns) = &mut layouts[0].columns {
                columns.push(ColumnRecord {
                    id: Presence::Present("quality".to_string()),
                    width: Presence::Present("80".to_string()),
                });
            }
        }

        let patch = LayoutsMapper.generate_patch(&original, &modified);
        assert_eq!(patch.len(), 1);
        assert!(matches!(
            &patch.operations[0],
            NodeOperation::InsertElement { index: Some(2), .. }
        ));
    }

    #[test]
    fn test_validate_duplicate_column_ids() {
        let mut record = LayoutsMapper.from_element(&parse_root(SAMPLE)).unwrap();
        if let Presence::Present(layouts) = &mut record.layouts {
            if let Presence::Present(columns) = &mut layouts[0].columns {
                let first = columns[0].clone();
                columns.push(first);
            }
        }
        let result = LayoutsMapper.validate(&record);
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("duplicate column id 'name'"));
    }
}

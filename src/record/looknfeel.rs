//! Looknfeel schema (UI widget definitions)
//!
//! Binds `Looknfeel.xml` and its overrides: a `<base>` root with a
//! `<widgets>` container of `<widget>` elements, each carrying layout and
//! styling attributes, an optional `<meshes>` container with seven mesh list
//! kinds, and optional recursive `<sub_widgets>`.
//!
//! Every attribute and child the game's widget schema declares is modeled,
//! so the mapper round-trip is lossless for this schema.

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

/// Edit record for one merged Looknfeel document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LooknfeelRecord {
    /// The root `type` attribute.
    #[serde(rename = "type")]
    pub kind: Presence<String>,
    /// The root `virtual_resolution` attribute.
    pub virtual_resolution: Presence<String>,
    /// The `widgets` container.
    pub widgets: Presence<Vec<WidgetRecord>>,
}

/// One `<widget>` (or `<sub_widget>`) definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    /// Widget `type` attribute.
    #[serde(rename = "type")]
    pub kind: Presence<String>,
    /// Widget `name` attribute (the merge/diff key).
    pub name: Presence<String>,
    pub tiling_border_size: Presence<String>,
    pub tile_background_according_to_border: Presence<String>,
    pub background_tile_size: Presence<String>,
    pub focusable: Presence<String>,
    pub style: Presence<String>,
    pub track_area_inset: Presence<String>,
    pub text: Presence<String>,
    pub initial_state: Presence<String>,
    pub num_of_cols: Presence<String>,
    pub num_of_rows: Presence<String>,
    pub max_num_of_rows: Presence<String>,
    pub border_size: Presence<String>,
    pub show_scroll_bars: Presence<String>,
    pub scroll_area_inset: Presence<String>,
    pub cell_size: Presence<String>,
    pub layout_style: Presence<String>,
    pub layout_alignment: Presence<String>,
    pub auto_show_scroll_bars: Presence<String>,
    pub increment_vec: Presence<String>,
    pub initial_value: Presence<String>,
    pub max_allowed_digit: Presence<String>,
    pub min_allowed_value: Presence<String>,
    pub max_allowed_value: Presence<String>,
    pub step_value: Presence<String>,
    pub min_value: Presence<String>,
    pub max_value: Presence<String>,
    pub vertical_alignment: Presence<String>,
    pub horizontal_alignment: Presence<String>,
    pub text_highlight_color: Presence<String>,
    pub text_color: Presence<String>,
    pub font_size: Presence<String>,
    pub size: Presence<String>,
    pub position: Presence<String>,
    pub button_mesh: Presence<String>,
    /// The optional `<meshes>` container.
    pub meshes: Presence<MeshesRecord>,
    /// The optional recursive `<sub_widgets>` container.
    pub sub_widgets: Presence<Vec<WidgetRecord>>,
}

/// Contents of a `<meshes>` container. The seven kinds are sibling elements
/// of one container, not nested lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshesRecord {
    pub background_meshes: Vec<MeshRecord>,
    pub button_meshes: Vec<MeshRecord>,
    pub button_pressed_meshes: Vec<MeshRecord>,
    pub highlight_meshes: Vec<MeshRecord>,
    pub cursor_meshes: Vec<MeshRecord>,
    pub left_border_meshes: Vec<MeshRecord>,
    pub right_border_meshes: Vec<MeshRecord>,
}

impl MeshesRecord {
    fn is_empty(&self) -> bool {
        MESH_KINDS.iter().all(|kind| (kind.get)(self).is_empty())
    }
}

/// One mesh reference inside a `<meshes>` container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Mesh `name` attribute (the diff key).
    pub name: Presence<String>,
    pub tiling: Presence<String>,
    pub main_mesh: Presence<String>,
    pub position: Presence<String>,
}

static ROOT_FIELDS: &[FieldSpec<LooknfeelRecord>] = &[
    FieldSpec { attr: "type", get: |r| &r.kind, get_mut: |r| &mut r.kind },
    FieldSpec { attr: "virtual_resolution", get: |r| &r.virtual_resolution, get_mut: |r| &mut r.virtual_resolution },
];

static WIDGET_FIELDS: &[FieldSpec<WidgetRecord>] = &[
    FieldSpec { attr: "type", get: |w| &w.kind, get_mut: |w| &mut w.kind },
    FieldSpec { attr: "name", get: |w| &w.name, get_mut: |w| &mut w.name },
    FieldSpec { attr: "tiling_border_size", get: |w| &w.tiling_border_size, get_mut: |w| &mut w.tiling_border_size },
    FieldSpec { attr: "tile_background_according_to_border", get: |w| &w.tile_background_according_to_border, get_mut: |w| &mut w.tile_background_according_to_border },
    FieldSpec { attr: "background_tile_size", get: |w| &w.background_tile_size, get_mut: |w| &mut w.background_tile_size },
    FieldSpec { attr: "focusable", get: |w| &w.focusable, get_mut: |w| &mut w.focusable },
    FieldSpec { attr: "style", get: |w| &w.style, get_mut: |w| &mut w.style },
    FieldSpec { attr: "track_area_inset", get: |w| &w.track_area_inset, get_mut: |w| &mut w.track_area_inset },
    FieldSpec { attr: "text", get: |w| &w.text, get_mut: |w| &mut w.text },
    FieldSpec { attr: "initial_state", get: |w| &w.initial_state, get_mut: |w| &mut w.initial_state },
    FieldSpec { attr: "num_of_cols", get: |w| &w.num_of_cols, get_mut: |w| &mut w.num_of_cols },
    FieldSpec { attr: "num_of_rows", get: |w| &w.num_of_rows, get_mut: |w| &mut w.num_of_rows },
    FieldSpec { attr: "max_num_of_rows", get: |w| &w.max_num_of_rows, get_mut: |w| &mut w.max_num_of_rows },
    FieldSpec { attr: "border_size", get: |w| &w.border_size, get_mut: |w| &mut w.border_size },
    FieldSpec { attr: "show_scroll_bars", get: |w| &w.show_scroll_bars, get_mut: |w| &mut w.show_scroll_bars },
    FieldSpec { attr: "scroll_area_inset", get: |w| &w.scroll_area_inset, get_mut: |w| &mut w.scroll_area_inset },
    FieldSpec { attr: "cell_size", get: |w| &w.cell_size, get_mut: |w| &mut w.cell_size },
    FieldSpec { attr: "layout_style", get: |w| &w.layout_style, get_mut: |w| &mut w.layout_style },
    FieldSpec { attr: "layout_alignment", get: |w| &w.layout_alignment, get_mut: |w| &mut w.layout_alignment },
    FieldSpec { attr: "auto_show_scroll_bars", get: |w| &w.auto_show_scroll_bars, get_mut: |w| &mut w.auto_show_scroll_bars },
    FieldSpec { attr: "increment_vec", get: |w| &w.increment_vec, get_mut: |w| &mut w.increment_vec },
    FieldSpec { attr: "initial_value", get: |w| &w.initial_value, get_mut: |w| &mut w.initial_value },
    FieldSpec { attr: "max_allowed_digit", get: |w| &w.max_allowed_digit, get_mut: |w| &mut w.max_allowed_digit },
    FieldSpec { attr: "min_allowed_value", get: |w| &w.min_allowed_value, get_mut: |w| &mut w.min_allowed_value },
    FieldSpec { attr: "max_allowed_value", get: |w| &w.max_allowed_value, get_mut: |w| &mut w.max_allowed_value },
    FieldSpec { attr: "step_value", get: |w| &w.step_value, get_mut: |w| &mut w.step_value },
    FieldSpec { attr: "min_value", get: |w| &w.min_value, get_mut: |w| &mut w.min_value },
    FieldSpec { attr: "max_value", get: |w| &w.max_value, get_mut: |w| &mut w.max_value },
    FieldSpec { attr: "vertical_alignment", get: |w| &w.vertical_alignment, get_mut: |w| &mut w.vertical_alignment },
    FieldSpec { attr: "horizontal_alignment", get: |w| &w.horizontal_alignment, get_mut: |w| &mut w.horizontal_alignment },
    FieldSpec { attr: "text_highlight_color", get: |w| &w.text_highlight_color, get_mut: |w| &mut w.text_highlight_color },
    FieldSpec { attr: "text_color", get: |w| &w.text_color, get_mut: |w| &mut w.text_color },
    FieldSpec { attr: "font_size", get: |w| &w.font_size, get_mut: |w| &mut w.font_size },
    FieldSpec { attr: "size", get: |w| &w.size, get_mut: |w| &mut w.size },
    FieldSpec { attr: "position", get: |w| &w.position, get_mut: |w| &mut w.position },
    FieldSpec { attr: "button_mesh", get: |w| &w.button_mesh, get_mut: |w| &mut w.button_mesh },
];

static MESH_FIELDS: &[FieldSpec<MeshRecord>] = &[
    FieldSpec { attr: "name", get: |m| &m.name, get_mut: |m| &mut m.name },
    FieldSpec { attr: "tiling", get: |m| &m.tiling, get_mut: |m| &mut m.tiling },
    FieldSpec { attr: "main_mesh", get: |m| &m.main_mesh, get_mut: |m| &mut m.main_mesh },
    FieldSpec { attr: "position", get: |m| &m.position, get_mut: |m| &mut m.position },
];

/// One mesh kind: its element name and the list holding it.
struct MeshKind {
    element: &'static str,
    get: fn(&MeshesRecord) -> &Vec<MeshRecord>,
    get_mut: fn(&mut MeshesRecord) -> &mut Vec<MeshRecord>,
}

static MESH_KINDS: &[MeshKind] = &[
    MeshKind { element: "background_mesh", get: |m| &m.background_meshes, get_mut: |m| &mut m.background_meshes },
    MeshKind { element: "button_mesh", get: |m| &m.button_meshes, get_mut: |m| &mut m.button_meshes },
    MeshKind { element: "button_pressed_mesh", get: |m| &m.button_pressed_meshes, get_mut: |m| &mut m.button_pressed_meshes },
    MeshKind { element: "highlight_mesh", get: |m| &m.highlight_meshes, get_mut: |m| &mut m.highlight_meshes },
    MeshKind { element: "cursor_mesh", get: |m| &m.cursor_meshes, get_mut: |m| &mut m.cursor_meshes },
    MeshKind { element: "left_border_mesh", get: |m| &m.left_border_meshes, get_mut: |m| &mut m.left_border_meshes },
    MeshKind { element: "right_border_mesh", get: |m| &m.right_border_meshes, get_mut: |m| &mut m.right_border_meshes },
];

/// Mapper between Looknfeel elements and [`LooknfeelRecord`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LooknfeelMapper;

impl RecordMapper for LooknfeelMapper {
    type Record = LooknfeelRecord;

    fn root_name(&self) -> &'static str {
        "base"
    }

    fn from_element(&self, element: &Element) -> Result<LooknfeelRecord> {
        check_root(element, "base")?;
        let mut record = LooknfeelRecord::default();
        read_fields(&mut record, element, ROOT_FIELDS);
        record.widgets = widget_list_from(element, "widgets", "widget");
        Ok(record)
    }

    fn to_element_with_original(
        &self,
        record: &LooknfeelRecord,
        original: Option<&Element>,
    ) -> Element {
        let mut element = Element::new("base");
        emit_attributes(&mut element, record, ROOT_FIELDS, original);
        emit_widget_list(
            &mut element,
            "widgets",
            "widget",
            &record.widgets,
            original,
        );
        element
    }

    fn generate_patch(&self, original: &LooknfeelRecord, modified: &LooknfeelRecord) -> Patch {
        let mut ops = Vec::new();
        let root = NodePath::root("base");
        diff_fields(&mut ops, &root, original, modified, ROOT_FIELDS);
        diff_widget_list(
            &mut ops,
            &root,
            "widgets",
            "widget",
            &original.widgets,
            &modified.widgets,
        );
        Patch { operations: ops }
    }

    fn validate(&self, record: &LooknfeelRecord) -> ValidationResult {
        let mut result = ValidationResult::new();
        if record.kind.value().is_none() {
            result.add_warning("type attribute is empty");
        }
        if record.widgets.is_absent() {
            result.add_warning("widgets container is missing");
        }
        validate_widgets(record.widgets.items(), "widget", &mut result);
        result
    }
}

fn widget_list_from(
    parent: &Element,
    container_name: &str,
    item_name: &str,
) -> Presence<Vec<WidgetRecord>> {
    match parent.child_element(container_name) {
        None => Presence::Absent,
        Some(container) => Presence::from_items(
            container
                .child_elements()
                .filter(|el| &*el.name == item_name)
                .map(widget_from_element)
                .collect(),
        ),
    }
}

fn widget_from_element(element: &Element) -> WidgetRecord {
    let mut widget = WidgetRecord::default();
    read_fields(&mut widget, element, WIDGET_FIELDS);
    widget.meshes = match element.child_element("meshes") {
        None => Presence::Absent,
        Some(container) => {
            let meshes = meshes_from_element(container);
            if meshes.is_empty() {
                Presence::PresentEmpty
            } else {
                Presence::Present(meshes)
            }
        }
    };
    widget.sub_widgets = widget_list_from(element, "sub_widgets", "sub_widget");
    widget
}

fn meshes_from_element(container: &Element) -> MeshesRecord {
    let mut meshes = MeshesRecord::default();
    for kind in MESH_KINDS {
        *(kind.get_mut)(&mut meshes) = container
            .child_elements()
            .filter(|el| &*el.name == kind.element)
            .map(mesh_from_element)
            .collect();
    }
    meshes
}

fn mesh_from_element(element: &Element) -> MeshRecord {
    let mut mesh = MeshRecord::default();
    read_fields(&mut mesh, element, MESH_FIELDS);
    mesh
}

fn emit_widget_list(
    parent: &mut Element,
    container_name: &str,
    item_name: &str,
    widgets: &Presence<Vec<WidgetRecord>>,
    original_parent: Option<&Element>,
) {
    if widgets.is_absent() {
        return;
    }
    let original = original_parent.and_then(|el| el.child_element(container_name));
    // An empty-but-present container re-emits as <name></name>, never
    // self-closed and never omitted, unless the source wrote <name/>.
    let mut container = Element::new(container_name);
    if let Some(original) = original {
        container.self_closing = original.self_closing;
    }
    for (i, widget) in widgets.items().iter().enumerate() {
        let original_item = original.and_then(|c| {
            c.child_elements()
                .filter(|el| &*el.name == item_name)
                .nth(i)
        });
        container.append_child(Node::Element(widget_to_element(
            widget,
            item_name,
            original_item,
        )));
    }
    parent.append_child(Node::Element(container));
}

fn widget_to_element(
    widget: &WidgetRecord,
    item_name: &str,
    original: Option<&Element>,
) -> Element {
    let mut element = Element::new(item_name);
    emit_attributes(&mut element, widget, WIDGET_FIELDS, original);
    emit_meshes(&mut element, &widget.meshes, original);
    emit_widget_list(
        &mut element,
        "sub_widgets",
        "sub_widget",
        &widget.sub_widgets,
        original,
    );
    element.self_closing = match original {
        Some(original) => original.self_closing,
        None => element.children.is_empty(),
    };
    element
}

fn emit_meshes(
    parent: &mut Element,
    meshes: &Presence<MeshesRecord>,
    original_parent: Option<&Element>,
) {
    if meshes.is_absent() {
        return;
    }
    let original = original_parent.and_then(|el| el.child_element("meshes"));
    let mut container = Element::new("meshes");
    if let Some(original) = original {
        container.self_closing = original.self_closing;
    }
    let empty = MeshesRecord::default();
    let record = meshes.value().unwrap_or(&empty);
    for kind in MESH_KINDS {
        for (i, mesh) in (kind.get)(record).iter().enumerate() {
            let original_item = original.and_then(|c| {
                c.child_elements()
                    .filter(|el| &*el.name == kind.element)
                    .nth(i)
            });
            container.append_child(Node::Element(mesh_to_element(
                mesh,
                kind.element,
                original_item,
            )));
        }
    }
    parent.append_child(Node::Element(container));
}

fn mesh_to_element(mesh: &MeshRecord, element_name: &str, original: Option<&Element>) -> Element {
    let mut element = Element::new_self_closing(element_name);
    emit_attributes(&mut element, mesh, MESH_FIELDS, original);
    if let Some(original) = original {
        element.self_closing = original.self_closing;
    }
    element
}

fn diff_widget_list(
    ops: &mut Vec<NodeOperation>,
    parent: &NodePath,
    container_name: &str,
    item_name: &str,
    original: &Presence<Vec<WidgetRecord>>,
    modified: &Presence<Vec<WidgetRecord>>,
) {
    match (original.is_absent(), modified.is_absent()) {
        (true, true) => {}
        (true, false) => {
            let mut scratch = Element::new("scratch");
            emit_widget_list(&mut scratch, container_name, item_name, modified, None);
            if let Some(container) = scratch.children.pop().and_then(|n| match n {
                Node::Element(el) => Some(el),
                _ => None,
            }) {
                ops.push(NodeOperation::InsertElement {
                    parent: parent.clone(),
                    element: container,
                    index: None,
                });
            }
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
                Some("name"),
                true,
                original.items(),
                modified.items(),
                |w: &WidgetRecord| w.name.value().cloned(),
                |w: &WidgetRecord| widget_to_element(w, item_name, None),
                |ops, path, before, after| diff_widget_pair(ops, path, before, after),
            );
        }
    }
}

fn diff_widget_pair(
    ops: &mut Vec<NodeOperation>,
    path: &NodePath,
    before: &WidgetRecord,
    after: &WidgetRecord,
) {
    diff_fields(ops, path, before, after, WIDGET_FIELDS);
    diff_meshes(ops, path, &before.meshes, &after.meshes);
    diff_widget_list(
        ops,
        path,
        "sub_widgets",
        "sub_widget",
        &before.sub_widgets,
        &after.sub_widgets,
    );
}

fn diff_meshes(
    ops: &mut Vec<NodeOperation>,
    widget_path: &NodePath,
    original: &Presence<MeshesRecord>,
    modified: &Presence<MeshesRecord>,
) {
    match (original.is_absent(), modified.is_absent()) {
        (true, true) => {}
        (true, false) => {
            let mut scratch = Element::new("scratch");
            emit_meshes(&mut scratch, modified, None);
            if let Some(container) = scratch.children.pop().and_then(|n| match n {
                Node::Element(el) => Some(el),
                _ => None,
            }) {
                ops.push(NodeOperation::InsertElement {
                    parent: widget_path.clone(),
                    element: container,
                    index: None,
                });
            }
        }
        (false, true) => ops.push(NodeOperation::RemoveElement {
            path: widget_path.join("meshes"),
        }),
        (false, false) => {
            let empty = MeshesRecord::default();
            let before = original.value().unwrap_or(&empty);
            let after = modified.value().unwrap_or(&empty);
            let meshes_path = widget_path.join("meshes");
            for kind in MESH_KINDS {
                diff_items(
                    ops,
                    &meshes_path,
                    kind.element,
                    Some("name"),
                    false,
                    (kind.get)(before),
                    (kind.get)(after),
                    |m: &MeshRecord| m.name.value().cloned(),
                    |m: &MeshRecord| mesh_to_element(m, kind.element, None),
                    |ops, path, before, after| {
                        diff_fields(ops, path, before, after, MESH_FIELDS);
                    },
                );
            }
        }
    }
}

fn validate_widgets(widgets: &[WidgetRecord], label: &str, result: &mut ValidationResult) {
    let mut seen: HashSet<&str> = HashSet::new();
    for widget in widgets {
        if let Some(name) = widget.name.value() {
            if !seen.insert(name.as_str()) {
                result.add_error(format!("duplicate {label} name '{name}'"));
            }
        }
    }
    for (i, widget) in widgets.iter().enumerate() {
        let mut child = ValidationResult::new();
        if widget.name.value().is_none() {
            child.add_warning("name is empty");
        }
        if widget.kind.value().is_none() {
            child.add_warning("type is empty");
        }
        if let Some(meshes) = widget.meshes.value() {
            for kind in MESH_KINDS {
                for (j, mesh) in (kind.get)(meshes).iter().enumerate() {
                    if mesh.name.value().is_none() {
                        child.add_warning(format!("{}[{j}]: name is empty", kind.element));
                    }
                }
            }
        }
        validate_widgets(widget.sub_widgets.items(), "sub_widget", &mut child);
        result.absorb(&format!("{label}[{i}]"), child);
    }
}

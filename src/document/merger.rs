//! Base + override document merging
//!
//! Mod load order is expressed as one base file plus an ordered list of
//! override files. Each override is unified element-by-element into the
//! base tree: attributes overwrite, unmatched children append, everything
//! the override does not touch keeps its exact identity and ordering.

use std::path::Path;

use indexmap::IndexMap;

use crate::document::document::Document;
use crate::document::reader::read_document;
use crate::document::writer::write_document;
use crate::error::{Error, Result};
use crate::tree::{Element, NameTable, Node};

/// Registry of designated key attributes, per element name.
///
/// Elements match by name alone unless their name is registered here, in
/// which case the key attribute values must match too (e.g. `<item name=...>`
/// matches by `name`).
#[derive(Debug, Clone)]
pub struct MergeKeys {
    keys: IndexMap<String, String>,
}

impl MergeKeys {
    /// A registry with no key attributes; everything matches by name only.
    #[must_use]
    pub fn empty() -> Self {
        MergeKeys {
            keys: IndexMap::new(),
        }
    }

    /// The key set used by the game's configuration schemas.
    #[must_use]
    pub fn bannerlord() -> Self {
        let mut keys = MergeKeys::empty();
        keys.set("widget", "name");
        keys.set("sub_widget", "name");
        keys.set("item", "name");
        keys.set("layout", "class");
        keys.set("column", "id");
        keys.set("insertion_definition", "label");
        keys
    }

    /// Registers (or replaces) a key attribute for an element name.
    pub fn set(&mut self, element: impl Into<String>, attribute: impl Into<String>) {
        self.keys.insert(element.into(), attribute.into());
    }

    /// The key attribute designated for an element name, if any.
    #[must_use]
    pub fn key_for(&self, element: &str) -> Option<&str> {
        self.keys.get(element).map(String::as_str)
    }
}

impl Default for MergeKeys {
    fn default() -> Self {
        MergeKeys::bannerlord()
    }
}

/// Options for merge operations.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Key attributes used to match repeated elements.
    pub keys: MergeKeys,
}

/// Loads and merges configuration documents, reusing one name-interning
/// table across every file it touches.
#[derive(Debug, Default)]
pub struct DocumentMerger {
    names: NameTable,
    options: MergeOptions,
}

impl DocumentMerger {
    /// Creates a merger with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a merger with explicit options.
    #[must_use]
    pub fn with_options(options: MergeOptions) -> Self {
        DocumentMerger {
            names: NameTable::new(),
            options,
        }
    }

    /// The name-interning table shared by every document this merger loaded.
    #[must_use]
    pub fn name_table(&self) -> &NameTable {
        &self.names
    }

    /// Loads the base file and merges each override file onto it in order.
    ///
    /// Missing override files are skipped: mods frequently patch only a
    /// subset of files, so absence is expected, not an error.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] when the base file is missing and
    /// [`Error::MalformedDocument`] when any present file fails to parse.
    pub fn load_and_merge<P, Q>(&mut self, base: P, overrides: &[Q]) -> Result<Document>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let base_path = base.as_ref();
        let mut document = read_document(base_path, &mut self.names)?;
        tracing::info!("Loaded base file: {}", base_path.display());

        let mut merged = 0;
        for override_path in overrides {
            let override_path = override_path.as_ref();
            if !override_path.exists() {
                tracing::warn!(
                    "Override file not found, skipping: {}",
                    override_path.display()
                );
                continue;
            }
            let overlay = read_document(override_path, &mut self.names)?;
            merge_documents(&mut document, &overlay, &self.options);
            merged += 1;
        }
        tracing::info!(
            "Merged {merged} of {} override file(s) onto {}",
            overrides.len(),
            base_path.display()
        );

        Ok(document)
    }

    /// Merges a list of module files where the first entry is the base and
    /// the rest are overrides in load order.
    ///
    /// # Errors
    /// Returns [`Error::NoModules`] when `paths` is empty.
    pub fn merge_modules<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Document> {
        let (base, overrides) = paths.split_first().ok_or(Error::NoModules)?;
        self.load_and_merge(base, overrides)
    }

    /// Serializes the document back to its original location, creating
    /// parent directories as needed.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save_to_original_location<P: AsRef<Path>>(
        &self,
        document: &Document,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        write_document(document, path)?;
        tracing::info!("Saved document to {}", path.display());
        Ok(())
    }
}

/// Merges `overlay` onto `base` in place.
pub fn merge_documents(base: &mut Document, overlay: &Document, options: &MergeOptions) {
    if base.root.name != overlay.root.name {
        tracing::warn!(
            "Merging document with root <{}> onto root <{}>",
            overlay.root.name,
            base.root.name
        );
    }
    merge_elements(&mut base.root, &overlay.root, &options.keys);
}

/// Recursive element unification.
fn merge_elements(base: &mut Element, overlay: &Element, keys: &MergeKeys) {
    // Attributes: override wins, base ordering kept, new ones append.
    for attr in &overlay.attributes {
        base.set_attribute(attr.name.clone(), attr.value.clone());
    }

    // Children: unify matching elements recursively, append the rest.
    for overlay_child in overlay.child_elements() {
        match find_match(base, overlay_child, keys) {
            Some(index) => {
                if let Some(base_child) = base.children[index].as_element_mut() {
                    merge_elements(base_child, overlay_child, keys);
                }
            }
            None => base.append_child(Node::Element(overlay_child.clone())),
        }
    }

    // Text: the override only fills in text the base does not have.
    let base_text = base.text();
    if base_text.is_empty() {
        let overlay_text = overlay.text();
        if !overlay_text.is_empty() {
            base.set_text(overlay_text);
        }
    }
}

/// Index (into `base.children`) of the first base child the overlay child
/// unifies with.
fn find_match(base: &Element, overlay_child: &Element, keys: &MergeKeys) -> Option<usize> {
    let key_attr = keys.key_for(&overlay_child.name);
    base.children.iter().position(|node| {
        let Some(base_child) = node.as_element() else {
            return false;
        };
        if base_child.name != overlay_child.name {
            return false;
        }
        match key_attr {
            Some(attr) => base_child.attribute(attr) == overlay_child.attribute(attr),
            None => true,
        }
    })
}

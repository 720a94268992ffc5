//! Edit session orchestration
//!
//! Wires the merger, one schema mapper, and the patch engine into the
//! load-edit-save cycle an editor drives. Sessions are synchronous and own
//! their document exclusively; callers that want background I/O offload the
//! whole call to a worker.
//!
//! The extraction path must address the mapper's root element (for the
//! built-in schemas, `/base`, which is also the document root): patch
//! operations generated from records are rooted there.

use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentMerger, MergeOptions};
use crate::error::{Error, Result};
use crate::patch::ApplyOutcome;
use crate::record::{RecordMapper, ValidationResult};
use crate::tree::NodePath;

/// One editing session over one merged document.
pub struct EditSession<M: RecordMapper> {
    merger: DocumentMerger,
    mapper: M,
    document: Option<Document>,
    record_path: Option<NodePath>,
    save_path: Option<PathBuf>,
}

impl<M: RecordMapper> EditSession<M> {
    /// Creates a session with default merge options.
    #[must_use]
    pub fn new(mapper: M) -> Self {
        Self::with_options(mapper, MergeOptions::default())
    }

    /// Creates a session with explicit merge options.
    #[must_use]
    pub fn with_options(mapper: M, options: MergeOptions) -> Self {
        EditSession {
            merger: DocumentMerger::with_options(options),
            mapper,
            document: None,
            record_path: None,
            save_path: None,
        }
    }

    /// Loads the base file, merges the overrides, extracts the element at
    /// `path`, and maps it to an edit record.
    ///
    /// # Errors
    /// Returns [`Error::NodeNotFound`] when `path` matches nothing; load and
    /// parse failures propagate from the merger.
    pub fn load_for_edit<P, Q>(
        &mut self,
        base: P,
        overrides: &[Q],
        path: &NodePath,
    ) -> Result<M::Record>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let document = self.merger.load_and_merge(base.as_ref(), overrides)?;
        let element = document
            .extract_for_editing(path)
            .ok_or_else(|| Error::NodeNotFound {
                path: path.to_string(),
            })?;
        let record = self.mapper.from_element(&element)?;

        self.document = Some(document);
        self.record_path = Some(path.clone());
        self.save_path = Some(base.as_ref().to_path_buf());
        Ok(record)
    }

    /// The merged document, once loaded.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Validates a record without touching any state.
    pub fn validate(&self, record: &M::Record) -> ValidationResult {
        self.mapper.validate(record)
    }

    /// Diffs the records, applies the patch to the live document, and saves
    /// it back to the base file's location. Untouched siblings, comments,
    /// and attribute ordering survive exactly.
    ///
    /// # Errors
    /// Returns [`Error::NoDocumentLoaded`] before a successful
    /// [`EditSession::load_for_edit`]; save failures propagate.
    pub fn save_changes(
        &mut self,
        original: &M::Record,
        modified: &M::Record,
    ) -> Result<ApplyOutcome> {
        let document = self.document.as_mut().ok_or(Error::NoDocumentLoaded)?;
        let save_path = self.save_path.as_ref().ok_or(Error::NoDocumentLoaded)?;

        let patch = self.mapper.generate_patch(original, modified);
        let outcome = patch.apply_to(document);
        self.merger.save_to_original_location(document, save_path)?;
        Ok(outcome)
    }

    /// Whole-element fallback: rebuilds the element from `modified`
    /// (threading the live element through for attribute ordering) and
    /// splices it in at the extraction path. Prefer
    /// [`EditSession::save_changes`]; this path drops constructs the schema
    /// does not model.
    ///
    /// # Errors
    /// Returns [`Error::NoDocumentLoaded`] before a load and
    /// [`Error::TargetNotFound`] when the extraction path no longer
    /// resolves.
    pub fn apply_record(&mut self, modified: &M::Record) -> Result<()> {
        let document = self.document.as_mut().ok_or(Error::NoDocumentLoaded)?;
        let path = self.record_path.as_ref().ok_or(Error::NoDocumentLoaded)?;
        let live = document
            .extract_for_editing(path)
            .ok_or_else(|| Error::TargetNotFound {
                path: path.to_string(),
            })?;
        let element = self.mapper.to_element_with_original(modified, Some(&live));
        document.apply_element_changes(path, &element)
    }
}

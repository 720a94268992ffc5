//! # BannerKit
//!
//! A pure-Rust engine for editing Mount & Blade II: Bannerlord mod
//! configuration XML with structural fidelity.
//!
//! The engine merges a base configuration file with the override files a mod
//! load order supplies, extracts sub-trees into typed edit records, computes
//! minimal patches between record states, and re-applies them so that every
//! byte of untouched input survives: sibling order, comments, attribute
//! order, and the difference between `<tags></tags>`, `<tags/>`, and no
//! `tags` element at all.
//!
//! ## Editing a merged document
//!
//! ```no_run
//! use bannerkit::record::{LooknfeelMapper, Presence};
//! use bannerkit::session::EditSession;
//! use bannerkit::tree::NodePath;
//!
//! let mut session = EditSession::new(LooknfeelMapper);
//! let record = session.load_for_edit(
//!     "Modules/Native/GUI/Looknfeel.xml",
//!     &["Modules/MyMod/GUI/Looknfeel.xml"],
//!     &NodePath::parse("/base")?,
//! )?;
//!
//! let mut edited = record.clone();
//! edited.virtual_resolution = Presence::Present("1920, 1080".to_string());
//!
//! let outcome = session.save_changes(&record, &edited)?;
//! println!("{}", outcome.summary());
//! # Ok::<(), bannerkit::Error>(())
//! ```
//!
//! ## Merging without editing
//!
//! ```no_run
//! use bannerkit::document::DocumentMerger;
//!
//! let mut merger = DocumentMerger::new();
//! let doc = merger.load_and_merge(
//!     "Modules/Native/module_data/item_modifiers.xml",
//!     &["Modules/MyMod/module_data/item_modifiers.xml"],
//! )?;
//! println!("{}", doc.stats().summary());
//! # Ok::<(), bannerkit::Error>(())
//! ```
//!
//! ## Diffing records by hand
//!
//! ```
//! use bannerkit::record::{LooknfeelMapper, Presence, RecordMapper};
//!
//! let mapper = LooknfeelMapper;
//! let original = bannerkit::record::LooknfeelRecord {
//!     kind: Presence::Present("widget".to_string()),
//!     ..Default::default()
//! };
//!
//! let mut modified = original.clone();
//! modified.kind = Presence::Present("screen".to_string());
//!
//! let patch = mapper.generate_patch(&original, &modified);
//! assert_eq!(patch.len(), 1);
//! ```

pub mod document;
pub mod error;
pub mod patch;
pub mod record;
pub mod session;
pub mod tree;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::document::{
        Document, DocumentMerger, DocumentStats, MergeKeys, MergeOptions, merge_documents,
        parse_document, read_document, serialize_document, write_document,
    };
    pub use crate::error::{Error, Result};
    pub use crate::patch::{ApplyOutcome, NodeOperation, Patch, apply};
    pub use crate::record::{
        LayoutsMapper, LayoutsRecord, LooknfeelMapper, LooknfeelRecord, Presence, RecordMapper,
        ValidationResult, WidgetRecord,
    };
    pub use crate::session::EditSession;
    pub use crate::tree::{Attribute, Element, NameTable, Node, NodePath};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

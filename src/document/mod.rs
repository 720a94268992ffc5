//! Document loading, merging, saving, and element extraction

#[allow(clippy::module_inception)]
mod document;
mod merger;
mod reader;
mod writer;

pub use document::{Document, DocumentStats};
pub use merger::{DocumentMerger, MergeKeys, MergeOptions, merge_documents};
pub use reader::{parse_document, read_document};
pub use writer::{serialize_document, write_document};

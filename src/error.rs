//! Error types for `BannerKit`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `BannerKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The base configuration file does not exist. Missing override files
    /// are skipped instead of raising this.
    #[error("base file not found: {path}")]
    FileNotFound {
        /// The missing base file path.
        path: PathBuf,
    },

    // ==================== Parsing Errors ====================
    /// A file could not be parsed as XML.
    #[error("malformed document {path}: {message}")]
    MalformedDocument {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying parser message.
        message: String,
    },

    /// XML parsing error from string input.
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// The document is structurally invalid (no root element, stray
    /// content after the root, unbalanced tags).
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    // ==================== Path Resolution Errors ====================
    /// A path expression could not be parsed.
    #[error("invalid path expression '{expr}': {message}")]
    InvalidPathExpression {
        /// The offending expression.
        expr: String,
        /// What is wrong with it.
        message: String,
    },

    /// A path resolved to nothing where the caller required a match.
    #[error("no node found at: {path}")]
    NodeNotFound {
        /// The path that matched nothing.
        path: String,
    },

    /// The injection target no longer exists at apply time.
    #[error("target not found at: {path}")]
    TargetNotFound {
        /// The path that matched nothing.
        path: String,
    },

    // ==================== Mapping Errors ====================
    /// A mapper was handed an element of the wrong schema.
    #[error("unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// The root element name the schema requires.
        expected: String,
        /// The root element name actually found.
        found: String,
    },

    // ==================== Session Errors ====================
    /// `merge_modules` was called with an empty path list.
    #[error("at least one module path is required")]
    NoModules,

    /// A save was attempted before any document was loaded.
    #[error("no document loaded")]
    NoDocumentLoaded,
}

// Add conversion from quick_xml::events::attributes::AttrError
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

/// A specialized Result type for `BannerKit` operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for glossa.

use thiserror::Error;

/// Result type for glossa operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for glossa operations.
///
/// Lookup misses (an unknown tier, annotation, or identifier) are never
/// reported through this type: queries return empty results and mutations
/// return `false`, because absence is a valid outcome in a partially
/// annotated document. `Error` is reserved for load/write failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required attribute or element is missing or invalid at load time.
    /// No partial document is returned.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parse or write error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid boundary pattern supplied for word/morpheme/gloss splitting.
    #[error("Invalid boundary pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// Create a malformed-document error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedDocument(msg.into())
    }
}

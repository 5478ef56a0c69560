//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur while reading a Word package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute inside an otherwise readable element
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Required part not found in the package
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Root element of a part does not have the expected shape
    #[error("XML shape mismatch: expected <{expected}>, found <{found}>")]
    ShapeMismatch {
        /// Tag the loader expected
        expected: &'static str,
        /// Tag actually present
        found: String,
    },

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;

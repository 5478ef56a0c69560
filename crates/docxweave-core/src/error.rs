//! Error types for conversion

use thiserror::Error;

use docxweave_ooxml::OoxmlError;

/// Errors surfaced by a conversion
///
/// Only an unreadable package is fatal. Everything the exporters can
/// recover from is logged and degraded instead of raised.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The package could not be opened or has no usable main document
    #[error("malformed document: {0}")]
    MalformedDocument(#[source] OoxmlError),

    /// Invalid settings file
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OoxmlError> for ConvertError {
    fn from(err: OoxmlError) -> Self {
        ConvertError::MalformedDocument(err)
    }
}

/// Result type alias using ConvertError
pub type Result<T> = std::result::Result<T, ConvertError>;

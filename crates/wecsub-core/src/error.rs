//! Error types for the wecsub core library.

use thiserror::Error;

/// Result type alias using the core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for subscription document handling.
#[derive(Debug, Error)]
pub enum Error {
    /// Subscription XML could not be parsed
    #[error("Failed to parse subscription XML: {0}")]
    Xml(#[from] xmltree::ParseError),

    /// Subscription XML could not be written
    #[error("Failed to write subscription XML: {0}")]
    XmlWrite(String),

    /// A required element is missing from the document
    #[error("Subscription document has no <{0}> element")]
    MissingElement(String),

    /// A value does not fit the subscription schema
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// Account name could not be translated to a SID
    #[error("Failed to resolve '{account}' to a SID: {reason}")]
    SidResolution { account: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with translation backends
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota exhaustion
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the text translator
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The backend failed while translating a piece of text
    #[error("Backend failed to translate \"{snippet}\": {source}")]
    Backend {
        /// Leading part of the text that was sent to the backend
        snippet: String,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },
}

/// Errors raised while turning input bytes into a document tree
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document is not valid UTF-8
    #[error("Document is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidEncoding {
        /// Byte offset of the first invalid sequence
        offset: usize,
    },
}

/// Filesystem failures, always tagged with the offending path
#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove directory tree {path:?}: {source}")]
    RemoveTree {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path:?}: {message}")]
    Walk {
        path: PathBuf,
        message: String,
    },
}

/// Failure of a single document translation; the whole file is abandoned
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] std::io::Error),

    /// Shutdown was requested while the document was in progress
    #[error("Translation abandoned after shutdown request")]
    Cancelled,
}

/// A placeholder that could not be found in the backend output.
///
/// Not fatal: the placeholder stays in the text verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Placeholder {placeholder} for \"{original}\" was not found in the translated text")]
pub struct MaskRestoreMismatch {
    pub placeholder: String,
    pub original: String,
}

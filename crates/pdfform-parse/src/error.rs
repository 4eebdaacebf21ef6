//! Error types for the lopdf backend.
//!
//! Uses [`thiserror`] for derivation. [`BackendError`] converts into
//! [`FormError`] so the facade exposes a single error type.

use pdfform_core::FormError;
use thiserror::Error;

/// Error type for backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fill batch could not be applied to the field tree.
    #[error("fill error: {0}")]
    Fill(String),

    /// Widgets could not be painted into page content.
    #[error("flatten error: {0}")]
    Flatten(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] FormError),
}

impl From<BackendError> for FormError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => FormError::ParseError(msg),
            BackendError::Io(e) => FormError::IoError(e.to_string()),
            BackendError::Fill(msg) => FormError::FillError(msg),
            BackendError::Flatten(msg) => FormError::FlattenError(msg),
            BackendError::Core(e) => e,
        }
    }
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

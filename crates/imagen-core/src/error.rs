//! Error types for the Imagen session core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Imagen workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ImagenError {
    /// Invalid user input (empty prompt/instruction, unsupported count)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation invalid in the current state (overlapping operation,
    /// editing without a selection)
    #[error("State error: {0}")]
    State(String),

    /// Index outside the bounds of the current result set
    #[error("Index {index} is out of bounds for {len} current results")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The external generative capability failed or returned an unusable result
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model resolved the edit request without producing an editable image
    #[error("Edit declined: {0}")]
    EditDeclined(String),

    /// No session snapshot exists at the storage slot
    #[error("No saved session found at '{slot}'")]
    NotFound { slot: String },

    /// A stored snapshot exists but cannot be decoded
    #[error("Corrupt session data: {format} - {message}")]
    CorruptData { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "base64", etc.
        message: String,
    },
}

impl ImagenError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a State error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Creates an IndexOutOfBounds error
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates an EditDeclined error
    pub fn edit_declined(message: impl Into<String>) -> Self {
        Self::EditDeclined(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(slot: impl Into<String>) -> Self {
        Self::NotFound { slot: slot.into() }
    }

    /// Creates a CorruptData error
    pub fn corrupt_data(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptData {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a State error
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Check if this is an IndexOutOfBounds error
    pub fn is_index_out_of_bounds(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }

    /// Check if this is a Provider error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Check if this is an EditDeclined error
    pub fn is_edit_declined(&self) -> bool {
        matches!(self, Self::EditDeclined(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a CorruptData error
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ImagenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ImagenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for ImagenError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Serialization {
            format: "base64".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ImagenError>`.
pub type Result<T> = std::result::Result<T, ImagenError>;

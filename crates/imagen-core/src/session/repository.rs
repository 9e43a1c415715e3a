//! Session store trait.
//!
//! Defines the interface for session persistence operations.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store holding one serialized session snapshot at a fixed,
/// well-known slot.
///
/// This trait decouples the application's core logic from the specific
/// storage mechanism (e.g. a JSON file, a database row, a browser storage
/// shim). Save and load are each a full-state transfer in one direction.
///
/// # Implementation Notes
///
/// Implementations must guarantee:
/// - `save` is atomic with respect to partial writes: a failed save leaves
///   any previously stored snapshot intact and readable.
/// - `load` distinguishes "no snapshot exists" (`NotFound`) from "a
///   snapshot exists but cannot be decoded" (`CorruptData`), and never
///   mutates in-memory state on failure.
/// - A snapshot missing optional fields loads with defaults rather than
///   failing.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Serializes the full session to the well-known slot.
    ///
    /// # Errors
    ///
    /// Returns an IO or serialization error; the prior snapshot, if any,
    /// remains readable.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Deserializes the snapshot at the well-known slot.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no snapshot has ever been saved.
    /// - `CorruptData` if the stored data cannot be decoded.
    async fn load(&self) -> Result<Session>;
}

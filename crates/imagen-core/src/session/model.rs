//! Session domain model.
//!
//! This module contains the Session entity that represents the complete
//! persistable working state of the image studio.

use super::ledger::HistoryLedger;
use crate::error::{ImagenError, Result};
use crate::image::Image;
use serde::{Deserialize, Serialize};

/// Generation fan-out: how many images one generation request produces.
///
/// The set is closed; any other count is a validation error at the
/// boundary and corrupt data when found in a stored snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BatchSize {
    /// A single image per request.
    #[default]
    One,
    /// Three images per request.
    Three,
}

impl BatchSize {
    /// Number of images this fan-out produces.
    pub fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Three => 3,
        }
    }
}

impl TryFrom<u8> for BatchSize {
    type Error = ImagenError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            3 => Ok(Self::Three),
            other => Err(ImagenError::validation(format!(
                "Unsupported image count: {other} (expected 1 or 3)"
            ))),
        }
    }
}

impl From<BatchSize> for u8 {
    fn from(value: BatchSize) -> Self {
        value.count() as u8
    }
}

/// The complete persistable working state: prompt, fan-out setting, the
/// current result set and the accumulated history.
///
/// This is the "pure" domain model that the workbench operates on,
/// independent of any storage format. It is created empty at process start,
/// mutated exclusively through workbench operations, persisted on explicit
/// save and replaced wholesale on explicit load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Current text input; may be empty.
    pub prompt: String,
    /// Generation fan-out requested for the next generation.
    pub requested_count: BatchSize,
    /// Current result set: empty, or exactly as many images as the last
    /// successful generation requested. Editing replaces by index.
    pub current_results: Vec<Image>,
    /// Append-only log of every image ever produced, newest first.
    pub history: HistoryLedger,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }
}

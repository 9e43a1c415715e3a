//! Observable per-operation status for the presentation boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The user-initiated operations the controller sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Generation,
    Edit,
    Save,
    Load,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generation => "generation",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::Load => "load",
        };
        f.write_str(name)
    }
}

/// Observable state of one operation.
///
/// The session snapshot is the single source of truth for succeeded data;
/// the status only signals where the operation stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationStatus {
    /// Never started, or the previous outcome has been superseded.
    #[default]
    Idle,
    /// Submitted and not yet resolved.
    Pending,
    /// Resolved successfully; the session snapshot reflects the result.
    Succeeded,
    /// Resolved with a failure.
    Failed { reason: String },
}

impl OperationStatus {
    /// Whether the operation is currently pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Per-operation status registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBoard {
    generation: OperationStatus,
    edit: OperationStatus,
    save: OperationStatus,
    load: OperationStatus,
}

impl StatusBoard {
    /// The status of one operation.
    pub fn get(&self, kind: OperationKind) -> &OperationStatus {
        match kind {
            OperationKind::Generation => &self.generation,
            OperationKind::Edit => &self.edit,
            OperationKind::Save => &self.save,
            OperationKind::Load => &self.load,
        }
    }

    /// Replaces the status of one operation.
    pub fn set(&mut self, kind: OperationKind, status: OperationStatus) {
        let slot = match kind {
            OperationKind::Generation => &mut self.generation,
            OperationKind::Edit => &mut self.edit,
            OperationKind::Save => &mut self.save,
            OperationKind::Load => &mut self.load,
        };
        *slot = status;
    }

    /// The operation currently pending, if any.
    pub fn pending(&self) -> Option<OperationKind> {
        [
            OperationKind::Generation,
            OperationKind::Edit,
            OperationKind::Save,
            OperationKind::Load,
        ]
        .into_iter()
        .find(|kind| self.get(*kind).is_pending())
    }
}

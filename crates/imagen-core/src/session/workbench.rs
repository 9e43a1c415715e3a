//! Result state machine for generation and editing.
//!
//! The workbench owns the session and sequences every mutation on it. The
//! asynchronous provider calls themselves happen outside: each operation is
//! split into a `begin_*` step (validate, guard, stage) and a `complete_*`
//! step (apply the outcome atomically), so the suspension point between them
//! holds no borrow of the session and partial effects are never observable.

use super::model::{BatchSize, Session};
use crate::error::{ImagenError, Result};
use crate::image::Image;
use serde::{Deserialize, Serialize};

/// Operation phase of the workbench.
///
/// At most one non-`Idle` phase exists at a time; entering `Generating` or
/// `Editing` while already busy is rejected. This is the
/// single-flight-per-session discipline, enforced here rather than left to
/// the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// No generation or edit call is outstanding.
    #[default]
    Idle,
    /// A generation call is outstanding; `expected` is the requested fan-out.
    Generating { expected: BatchSize },
    /// An edit call is outstanding against `current_results[index]`.
    Editing { index: usize },
}

/// Transient pointer to one current-result index plus the in-progress edit
/// instruction. Exists only between selection and submission/cancellation;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditContext {
    index: usize,
    instruction: String,
}

impl EditContext {
    /// Index of the selected image within the current results.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The instruction staged so far (may be empty until submission).
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Staged payload for an outgoing generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub count: BatchSize,
}

/// Staged payload for an outgoing edit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub image: Image,
    pub instruction: String,
}

/// The result state machine: owns the session, the current phase and the
/// edit selection, and enforces the invariants of the current result set
/// and the history ledger.
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    session: Session,
    phase: Phase,
    edit: Option<EditContext>,
}

impl Workbench {
    /// Creates a workbench over an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the owned session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current operation phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The active edit selection, if any.
    pub fn edit_selection(&self) -> Option<&EditContext> {
        self.edit.as_ref()
    }

    /// Updates the session prompt without generating. Keeps typed-but-not-
    /// submitted input part of the persistable state.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.session.prompt = prompt.into();
    }

    /// Updates the requested generation fan-out for subsequent requests.
    pub fn set_requested_count(&mut self, count: BatchSize) {
        self.session.requested_count = count;
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Stages a generation request.
    ///
    /// Validates the prompt, records prompt and fan-out into the session,
    /// clears the current results and any edit selection, and enters
    /// `Generating`. The returned request is what the caller hands to the
    /// external generation capability.
    ///
    /// # Errors
    ///
    /// - `Validation` if the prompt is empty. No state changes.
    /// - `State` if a generation or edit is already in flight. No state
    ///   changes.
    pub fn begin_generation(
        &mut self,
        prompt: &str,
        count: BatchSize,
    ) -> Result<GenerationRequest> {
        if prompt.trim().is_empty() {
            return Err(ImagenError::validation("Please enter a prompt."));
        }
        self.ensure_idle("start a generation")?;

        self.session.prompt = prompt.to_string();
        self.session.requested_count = count;
        // Results are cleared up front: a failed generation shows an empty
        // grid rather than stale images next to an error message.
        self.session.current_results.clear();
        self.edit = None;
        self.phase = Phase::Generating { expected: count };

        Ok(GenerationRequest {
            prompt: prompt.to_string(),
            count,
        })
    }

    /// Applies the outcome of a generation call in one atomic step.
    ///
    /// On success the returned batch becomes the current result set and is
    /// recorded in the history ledger as one contiguous block, newest first.
    /// A batch of the wrong size is a provider failure, never a partial
    /// success. On failure the results stay empty and history is untouched.
    /// The workbench returns to `Idle` in every case.
    ///
    /// # Errors
    ///
    /// - `State` if no generation is in flight.
    /// - The provider failure, propagated as the failure reason.
    pub fn complete_generation(&mut self, outcome: Result<Vec<Image>>) -> Result<()> {
        let Phase::Generating { expected } = self.phase else {
            return Err(ImagenError::state("no generation is in flight"));
        };
        self.phase = Phase::Idle;

        let images = outcome?;
        if images.len() != expected.count() {
            return Err(ImagenError::provider(format!(
                "expected {} images, provider returned {}",
                expected.count(),
                images.len()
            )));
        }

        self.session.current_results = images.clone();
        self.session.history.record_batch(images);
        Ok(())
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Selects one current result for editing.
    ///
    /// Selection alone does not block generation; only submission does.
    ///
    /// # Errors
    ///
    /// - `State` if a generation or edit is in flight.
    /// - `IndexOutOfBounds` if `index` does not address a current result.
    pub fn select_for_edit(&mut self, index: usize) -> Result<()> {
        self.ensure_idle("select an image for editing")?;
        let len = self.session.current_results.len();
        if index >= len {
            return Err(ImagenError::index_out_of_bounds(index, len));
        }

        self.edit = Some(EditContext {
            index,
            instruction: String::new(),
        });
        Ok(())
    }

    /// Stages the in-progress edit instruction on the active selection.
    ///
    /// # Errors
    ///
    /// `State` if no image is selected.
    pub fn update_edit_instruction(&mut self, instruction: impl Into<String>) -> Result<()> {
        let edit = self
            .edit
            .as_mut()
            .ok_or_else(|| ImagenError::state("no image is selected for editing"))?;
        edit.instruction = instruction.into();
        Ok(())
    }

    /// Submits the active selection for editing.
    ///
    /// Consumes the edit context and enters `Editing`; the returned request
    /// carries a clone of the selected image for the external edit
    /// capability. Once submitted, the call runs to completion or failure;
    /// cancellation no longer applies.
    ///
    /// # Errors
    ///
    /// - `Validation` if the instruction is empty. The selection is kept.
    /// - `State` if no image is selected or an operation is in flight.
    pub fn begin_edit(&mut self, instruction: &str) -> Result<EditRequest> {
        let index = match self.edit.as_ref() {
            Some(edit) => edit.index,
            None => return Err(ImagenError::state("no image is selected for editing")),
        };
        if instruction.trim().is_empty() {
            return Err(ImagenError::validation(
                "Please enter a description of your desired changes.",
            ));
        }
        self.ensure_idle("submit an edit")?;
        let len = self.session.current_results.len();
        if index >= len {
            return Err(ImagenError::index_out_of_bounds(index, len));
        }

        // The selection is consumed by submission; the phase carries the
        // target index until the call resolves.
        self.edit = None;
        self.phase = Phase::Editing { index };
        Ok(EditRequest {
            image: self.session.current_results[index].clone(),
            instruction: instruction.to_string(),
        })
    }

    /// Applies the outcome of an edit call in one atomic step.
    ///
    /// On success the edited image replaces `current_results[index]` in
    /// place, leaving length and order of the result set otherwise
    /// unchanged, and is recorded at the front of the history ledger. On failure
    /// (declined edit or transport failure alike) the results are left
    /// completely unchanged. The workbench returns to `Idle` in every case.
    ///
    /// # Errors
    ///
    /// - `State` if no edit is in flight.
    /// - The provider failure, propagated as the failure reason.
    pub fn complete_edit(&mut self, outcome: Result<Image>) -> Result<()> {
        let Phase::Editing { index } = self.phase else {
            return Err(ImagenError::state("no edit is in flight"));
        };
        self.phase = Phase::Idle;

        let image = outcome?;
        let len = self.session.current_results.len();
        let slot = self
            .session
            .current_results
            .get_mut(index)
            .ok_or_else(|| ImagenError::index_out_of_bounds(index, len))?;
        *slot = image.clone();
        self.session.history.record(image);
        Ok(())
    }

    /// Discards the edit selection if one exists.
    ///
    /// Idempotent and infallible. Does not abort an already-submitted edit:
    /// submission consumed the selection, so the in-flight call simply runs
    /// to completion.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Replaces the owned session wholesale.
    ///
    /// Used only by session load. Drops any edit selection; nothing of the
    /// pre-load state survives.
    ///
    /// # Errors
    ///
    /// `State` if a generation or edit is in flight.
    pub fn load_session(&mut self, session: Session) -> Result<()> {
        self.ensure_idle("load a session")?;
        self.session = session;
        self.edit = None;
        Ok(())
    }

    fn ensure_idle(&self, action: &str) -> Result<()> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Generating { .. } => Err(ImagenError::state(format!(
                "cannot {action} while a generation is in flight"
            ))),
            Phase::Editing { .. } => Err(ImagenError::state(format!(
                "cannot {action} while an edit is in flight"
            ))),
        }
    }
}

impl From<Session> for Workbench {
    fn from(session: Session) -> Self {
        Self {
            session,
            phase: Phase::Idle,
            edit: None,
        }
    }
}

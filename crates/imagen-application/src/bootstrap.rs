//! Default wiring of the full application stack.

use crate::controller::Controller;
use imagen_core::Result;
use imagen_infrastructure::JsonSessionStore;
use imagen_interaction::{GeminiImageEditor, GeminiImageGenerator};
use std::sync::Arc;

/// Builds a controller wired to the Gemini providers and the file-backed
/// session store at its default location (`~/.imagen`).
///
/// Provider configuration comes from the environment (`GEMINI_API_KEY`,
/// optional `GEMINI_IMAGE_MODEL`/`GEMINI_EDIT_MODEL`).
///
/// # Errors
///
/// Returns an error if the API key is missing or the store directory
/// cannot be created.
pub fn controller_from_env() -> Result<Controller> {
    let generator = Arc::new(GeminiImageGenerator::try_from_env()?);
    let editor = Arc::new(GeminiImageEditor::try_from_env()?);
    let store = Arc::new(JsonSessionStore::default_location()?);

    Ok(Controller::new(generator, editor, store))
}

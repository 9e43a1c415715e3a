//! JSON file-backed SessionStore implementation.

use crate::dto::SessionSnapshot;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use imagen_core::{ImagenError, Result, Session, SessionStore};
use std::fs;
use std::path::Path;

/// Name of the single well-known slot inside the base directory.
const SESSION_FILE: &str = "session.json";

/// A store persisting the session snapshot as one JSON document.
///
/// Directory structure:
/// ```text
/// base_dir/
/// └── session.json
/// ```
///
/// Writes go through [`AtomicJsonFile`], so an interrupted save never
/// corrupts the previously stored snapshot.
pub struct JsonSessionStore {
    file: AtomicJsonFile<SessionSnapshot>,
}

impl JsonSessionStore {
    /// Creates a store rooted at the given base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;

        Ok(Self {
            file: AtomicJsonFile::new(base_dir.join(SESSION_FILE)),
        })
    }

    /// Creates a store at the default location (`~/.imagen`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory structure cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| ImagenError::io("Failed to get home directory"))?;
        Self::new(home_dir.join(".imagen"))
    }

    /// The path of the session slot.
    pub fn slot_path(&self) -> &Path {
        self.file.path()
    }

    fn slot_name(&self) -> String {
        self.file.path().display().to_string()
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let snapshot = SessionSnapshot::from_domain(session);
        self.file.save(&snapshot)?;
        tracing::debug!(
            slot = %self.slot_name(),
            history = session.history.len(),
            "session snapshot saved"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Session> {
        let snapshot = self
            .file
            .load()?
            .ok_or_else(|| ImagenError::not_found(self.slot_name()))?;

        let session = snapshot.into_domain()?;
        tracing::debug!(
            slot = %self.slot_name(),
            history = session.history.len(),
            "session snapshot loaded"
        );
        Ok(session)
    }
}

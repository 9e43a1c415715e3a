//! Atomic JSON file operations.
//!
//! Provides a thin layer for safe access to a single JSON document on disk.

use imagen_core::{ImagenError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A handle to an atomically written JSON file.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: An advisory file lock prevents concurrent writers
/// - **Durability**: Explicit fsync before rename
///
/// A failed or interrupted save therefore never corrupts a previously
/// stored document.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new handle for the JSON document at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// The path of the underlying document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: IO failure, or `CorruptData` if the content doesn't parse
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)
            .map_err(|e| ImagenError::corrupt_data("JSON", e.to_string()))?;
        Ok(Some(data))
    }

    /// Saves the document atomically.
    ///
    /// Serializes, writes to a temporary file in the same directory, fsyncs
    /// and renames over the destination while holding an exclusive lock.
    pub fn save(&self, data: &T) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(data)?;

        // Write to temporary file in the same directory
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(&json)?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        // Atomic rename
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Gets a temporary file path for atomic writes.
    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| ImagenError::io("Path has no parent directory"))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ImagenError::io("Path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// A file lock guard that automatically releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock next to the given path.
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| ImagenError::io(format!("Failed to acquire lock: {}", e)))?;
        }

        #[cfg(not(unix))]
        {
            // On non-Unix systems advisory locking is skipped. Acceptable
            // for a single-user desktop session store.
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped.
        // Try to remove lock file (best effort)
        let _ = fs::remove_file(&self.lock_path);
    }
}

pub mod error;
pub mod image;
pub mod provider;
pub mod session;

// Re-export common types
pub use error::{ImagenError, Result};
pub use image::Image;
pub use provider::{ImageEditor, ImageGenerator};
pub use session::{BatchSize, HistoryLedger, Session, SessionStore, Workbench};

//! Data transfer objects for the persisted wire formats.

pub mod session;

pub use session::{ImageData, SessionSnapshot};

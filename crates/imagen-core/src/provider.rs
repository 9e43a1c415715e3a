//! Capability traits for the external generative model.
//!
//! The generation and editing capabilities are opaque asynchronous
//! collaborators; the session core never knows which provider or transport
//! sits behind them.

use crate::error::Result;
use crate::image::Image;
use crate::session::BatchSize;
use async_trait::async_trait;

/// An abstract text-to-image generation capability.
///
/// Pure request/response, no streaming. The caller (the workbench) verifies
/// that exactly `count` images came back; returning fewer is treated as a
/// provider failure, never a partial success.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates `count` images from the given prompt.
    ///
    /// # Errors
    ///
    /// Returns a provider error with a descriptive message when the
    /// capability fails or produces an unusable result.
    async fn generate(&self, prompt: &str, count: BatchSize) -> Result<Vec<Image>>;
}

/// An abstract instruction-guided image editing capability.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Produces an edited version of `image` following `instruction`.
    ///
    /// # Errors
    ///
    /// - [`ImagenError::EditDeclined`](crate::ImagenError::EditDeclined)
    ///   when the model resolved the request without producing an editable
    ///   image (distinct from transport failure).
    /// - [`ImagenError::Provider`](crate::ImagenError::Provider) for any
    ///   other failure.
    async fn edit(&self, image: &Image, instruction: &str) -> Result<Image>;
}

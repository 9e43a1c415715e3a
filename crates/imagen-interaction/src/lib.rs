//! Provider adapters for the Gemini image APIs.

pub mod gemini_image_editor;
pub mod gemini_image_generator;
mod wire;

pub use gemini_image_editor::GeminiImageEditor;
pub use gemini_image_generator::GeminiImageGenerator;

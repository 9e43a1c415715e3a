//! GeminiImageEditor - Direct REST implementation of the editing
//! capability against the `:generateContent` endpoint with inline image
//! data.

use crate::wire::{API_KEY_ENV, BASE_URL, map_http_error, map_transport_error};
use async_trait::async_trait;
use imagen_core::{Image, ImageEditor, ImagenError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Message surfaced when the model resolves an edit request without
/// producing an image.
const DECLINED_MESSAGE: &str =
    "The model could not edit the image as requested. Please try a different prompt.";

/// Editing capability backed by the Gemini multimodal HTTP API.
///
/// The source image travels as inline data alongside the instruction text;
/// the edited image comes back as an inline-data part of the first
/// candidate. A candidate without an inline image part is the distinguished
/// "edit declined" failure, not a transport error.
#[derive(Clone)]
pub struct GeminiImageEditor {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiImageEditor {
    /// Creates a new editor with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_EDIT_MODEL.to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Reads `GEMINI_API_KEY` (required) and `GEMINI_EDIT_MODEL` (optional,
    /// defaults to `gemini-2.5-flash-image-preview`).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the API key is not set.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            ImagenError::validation(format!("{API_KEY_ENV} not found in environment variables"))
        })?;
        let model = env::var("GEMINI_EDIT_MODEL").unwrap_or_else(|_| DEFAULT_EDIT_MODEL.into());

        Ok(Self::new(api_key).with_model(model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error("Image edit request failed", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| map_transport_error("Failed to parse edit response", err))
    }
}

#[async_trait]
impl ImageEditor for GeminiImageEditor {
    async fn edit(&self, image: &Image, instruction: &str) -> Result<Image> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        };

        tracing::debug!(model = %self.model, "sending edit request");
        let response = self.send_request(&request).await?;
        extract_edited_image(response)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    #[allow(dead_code)]
    text: Option<String>,
    inline_data: Option<InlineDataPayload>,
}

fn extract_edited_image(response: GenerateContentResponse) -> Result<Image> {
    let inline = response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                candidates.swap_remove(0).content
            }
        })
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .find_map(|part| part.inline_data)
        });

    match inline {
        Some(payload) => Image::from_base64(&payload.data, payload.mime_type)
            .map_err(|e| ImagenError::provider(format!("Undecodable edited image: {e}"))),
        None => Err(ImagenError::edit_declined(DECLINED_MESSAGE)),
    }
}

//! GeminiImageGenerator - Direct REST implementation of the generation
//! capability against the Imagen `:predict` endpoint.

use crate::wire::{API_KEY_ENV, BASE_URL, map_http_error, map_transport_error};
use async_trait::async_trait;
use imagen_core::{BatchSize, Image, ImageGenerator, ImagenError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Generation capability backed by the Imagen HTTP API.
#[derive(Clone)]
pub struct GeminiImageGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiImageGenerator {
    /// Creates a new generator with the provided API key and the default
    /// model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Reads `GEMINI_API_KEY` (required) and `GEMINI_IMAGE_MODEL`
    /// (optional, defaults to `imagen-4.0-generate-001`).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the API key is not set.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            ImagenError::validation(format!("{API_KEY_ENV} not found in environment variables"))
        })?;
        let model = env::var("GEMINI_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.into());

        Ok(Self::new(api_key).with_model(model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &PredictRequest) -> Result<PredictResponse> {
        let url = format!(
            "{}/{model}:predict?key={api_key}",
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
            .map_err(|err| map_transport_error("Image generation request failed", err))?;

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
            .map_err(|err| map_transport_error("Failed to parse generation response", err))
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(&self, prompt: &str, count: BatchSize) -> Result<Vec<Image>> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: count.count() as u32,
                output_mime_type: OUTPUT_MIME_TYPE.to_string(),
            },
        };

        tracing::debug!(model = %self.model, count = count.count(), "sending generation request");
        let response = self.send_request(&request).await?;
        extract_images(response, count.count())
    }
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    output_mime_type: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Option<Vec<Prediction>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

fn extract_images(response: PredictResponse, expected: usize) -> Result<Vec<Image>> {
    let predictions = response.predictions.unwrap_or_default();

    let images = predictions
        .into_iter()
        .filter_map(|prediction| {
            let data = prediction.bytes_base64_encoded?;
            let mime_type = prediction
                .mime_type
                .unwrap_or_else(|| OUTPUT_MIME_TYPE.to_string());
            Some(Image::from_base64(&data, mime_type))
        })
        .collect::<Result<Vec<_>>>()
        .map_err(|e| ImagenError::provider(format!("Undecodable image payload: {e}")))?;

    if images.len() != expected {
        return Err(ImagenError::provider(format!(
            "The model returned {} of {} requested images",
            images.len(),
            expected
        )));
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: "a robot".to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 3,
                output_mime_type: OUTPUT_MIME_TYPE.to_string(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["instances"][0]["prompt"], "a robot");
        assert_eq!(json["parameters"]["sampleCount"], 3);
        assert_eq!(json["parameters"]["outputMimeType"], "image/jpeg");
    }

    #[test]
    fn test_extract_images() {
        let response: PredictResponse = serde_json::from_str(
            r#"{"predictions": [
                {"bytesBase64Encoded": "AQ==", "mimeType": "image/jpeg"},
                {"bytesBase64Encoded": "Ag=="}
            ]}"#,
        )
        .unwrap();

        let images = extract_images(response, 2).unwrap();
        assert_eq!(images[0].data, vec![1]);
        assert_eq!(images[0].mime_type, "image/jpeg");
        // Missing mimeType falls back to the requested output type.
        assert_eq!(images[1].mime_type, "image/jpeg");
    }

    #[test]
    fn test_short_batch_is_provider_error() {
        let response: PredictResponse = serde_json::from_str(
            r#"{"predictions": [{"bytesBase64Encoded": "AQ=="}]}"#,
        )
        .unwrap();

        let err = extract_images(response, 3).unwrap_err();
        assert!(err.is_provider());
        assert!(err.to_string().contains("1 of 3"));
    }

    #[test]
    fn test_empty_response_is_provider_error() {
        let response: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_images(response, 1).unwrap_err().is_provider());
    }
}

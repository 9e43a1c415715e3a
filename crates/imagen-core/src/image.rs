//! Opaque generated image artifacts.

use crate::error::{ImagenError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

/// An opaque generated artifact: encoded byte payload plus MIME type.
///
/// Identity is purely positional (the image's index in the current result
/// set or the history ledger); no stable ID is assigned and byte-identical
/// images are never deduplicated.
///
/// The serialized form matches the persisted wire format:
/// `{ "data": <base64>, "mimeType": <string> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Encoded payload (e.g. JPEG bytes), base64 on the wire.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the payload (e.g. `image/jpeg`).
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl Image {
    /// Creates an image from raw payload bytes and a MIME type.
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Creates an image from a base64-encoded payload.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload is not valid base64.
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> Result<Self> {
        let bytes = BASE64_STANDARD.decode(data)?;
        Ok(Self::new(bytes, mime_type))
    }

    /// Parses a `data:<mime>;base64,<payload>` URL into an image.
    ///
    /// Legacy snapshots stored images in this display-ready form, so
    /// snapshots written in either shape round-trip losslessly.
    ///
    /// # Errors
    ///
    /// Returns a corrupt-data error if the string is not a base64 data URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ImagenError::corrupt_data("data-url", "missing 'data:' prefix"))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| ImagenError::corrupt_data("data-url", "missing ';base64,' marker"))?;
        let bytes = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| ImagenError::corrupt_data("data-url", e.to_string()))?;
        Ok(Self::new(bytes, mime_type))
    }

    /// Returns the payload encoded as base64.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.data)
    }

    /// Returns the display-ready `data:<mime>;base64,<payload>` form.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Serde adapter encoding the byte payload as a base64 string.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let image = Image::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg");
        let url = image.data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let parsed = Image::from_data_url(&url).unwrap();
        assert_eq!(parsed, image);
    }

    #[test]
    fn test_from_base64() {
        let image = Image::from_base64("AQID", "image/png").unwrap();
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_from_base64_rejects_invalid_payload() {
        let err = Image::from_base64("not base64!!!", "image/png").unwrap_err();
        assert!(matches!(err, ImagenError::Serialization { .. }));
    }

    #[test]
    fn test_from_data_url_rejects_plain_string() {
        let err = Image::from_data_url("hello").unwrap_err();
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn test_serde_wire_format() {
        let image = Image::new(vec![1, 2, 3], "image/jpeg");
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["data"], "AQID");
        assert_eq!(json["mimeType"], "image/jpeg");

        let back: Image = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }
}

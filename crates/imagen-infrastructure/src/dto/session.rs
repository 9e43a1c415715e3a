//! Session snapshot DTO: the persisted wire format.

use imagen_core::session::HistoryLedger;
use imagen_core::{BatchSize, Image, ImagenError, Result, Session};
use serde::{Deserialize, Serialize};

/// The serialized session document stored at the well-known slot.
///
/// Field names follow the wire contract: `prompt`, `requestedCount`,
/// `currentResults`, `historyImages`. There is no schema version field;
/// forward compatibility comes from every field carrying a default, so a
/// snapshot written before a field existed still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_requested_count")]
    pub requested_count: u8,
    #[serde(default)]
    pub current_results: Vec<ImageData>,
    #[serde(default)]
    pub history_images: Vec<ImageData>,
}

fn default_requested_count() -> u8 {
    1
}

/// One image on the wire: either a `{data, mimeType}` record or a single
/// base64 data-URL string. Both round-trip losslessly; records are what we
/// write, data URLs are accepted for snapshots written in that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageData {
    Record {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    DataUrl(String),
}

impl ImageData {
    fn from_domain(image: &Image) -> Self {
        Self::Record {
            data: image.to_base64(),
            mime_type: image.mime_type.clone(),
        }
    }

    fn into_domain(self) -> Result<Image> {
        match self {
            Self::Record { data, mime_type } => Image::from_base64(&data, mime_type)
                .map_err(|e| ImagenError::corrupt_data("JSON", e.to_string())),
            Self::DataUrl(url) => Image::from_data_url(&url),
        }
    }
}

impl SessionSnapshot {
    /// Converts a domain session into the wire document.
    pub fn from_domain(session: &Session) -> Self {
        Self {
            prompt: session.prompt.clone(),
            requested_count: session.requested_count.into(),
            current_results: session
                .current_results
                .iter()
                .map(ImageData::from_domain)
                .collect(),
            history_images: session
                .history
                .images()
                .iter()
                .map(ImageData::from_domain)
                .collect(),
        }
    }

    /// Converts the wire document into a domain session.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` for an out-of-range `requestedCount` or an
    /// undecodable image payload. A *missing* count defaults to 1; an
    /// invalid one is corrupt, not defaulted.
    pub fn into_domain(self) -> Result<Session> {
        let requested_count = BatchSize::try_from(self.requested_count)
            .map_err(|e| ImagenError::corrupt_data("JSON", e.to_string()))?;

        let current_results = self
            .current_results
            .into_iter()
            .map(ImageData::into_domain)
            .collect::<Result<Vec<_>>>()?;

        let history_images = self
            .history_images
            .into_iter()
            .map(ImageData::into_domain)
            .collect::<Result<Vec<_>>>()?;

        Ok(Session {
            prompt: self.prompt,
            requested_count,
            current_results,
            history: HistoryLedger::from(history_images),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_images() -> Session {
        let mut session = Session::new();
        session.prompt = "a robot".to_string();
        session.requested_count = BatchSize::Three;
        session.current_results = vec![Image::new(vec![1], "image/jpeg")];
        session
            .history
            .replace_all(vec![Image::new(vec![1], "image/jpeg"), Image::new(vec![2], "image/png")]);
        session
    }

    #[test]
    fn test_round_trip_preserves_session() {
        let session = session_with_images();
        let snapshot = SessionSnapshot::from_domain(&session);
        let restored = snapshot.into_domain().unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_wire_field_names() {
        let snapshot = SessionSnapshot::from_domain(&session_with_images());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["prompt"], "a robot");
        assert_eq!(json["requestedCount"], 3);
        assert_eq!(json["currentResults"][0]["data"], "AQ==");
        assert_eq!(json["currentResults"][0]["mimeType"], "image/jpeg");
        assert!(json["historyImages"].as_array().unwrap().len() == 2);
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: SessionSnapshot = serde_json::from_str("{}").unwrap();
        let session = snapshot.into_domain().unwrap();

        assert_eq!(session.prompt, "");
        assert_eq!(session.requested_count, BatchSize::One);
        assert!(session.current_results.is_empty());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_invalid_requested_count_is_corrupt() {
        let snapshot: SessionSnapshot =
            serde_json::from_str(r#"{"requestedCount": 7}"#).unwrap();
        let err = snapshot.into_domain().unwrap_err();
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn test_data_url_images_are_accepted() {
        let url = Image::new(vec![1, 2, 3], "image/jpeg").data_url();
        let json = format!(r#"{{"currentResults": ["{url}"]}}"#);

        let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let session = snapshot.into_domain().unwrap();

        assert_eq!(session.current_results[0].data, vec![1, 2, 3]);
        assert_eq!(session.current_results[0].mime_type, "image/jpeg");
    }

    #[test]
    fn test_undecodable_image_payload_is_corrupt() {
        let json = r#"{"currentResults": [{"data": "!!!", "mimeType": "image/jpeg"}]}"#;
        let snapshot: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.into_domain().unwrap_err().is_corrupt_data());
    }
}

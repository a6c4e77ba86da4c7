//! Remote slide store interface.
//!
//! The backend keeps one record per slide, keyed by presentation name and
//! the slide id (`randomId`), holding the slide's rendered PNG and its
//! position in the deck.

use crate::model::SlideId;
use crate::storage::BoxFuture;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePresentationRequest {
    pub presentation_name: String,
    pub created_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    pub random_id: SlideId,
    pub presentation_name: String,
    /// 1-based position in the deck.
    pub slide_order: usize,
    /// Base64 PNG without a data-URL prefix.
    pub slide_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlideRequest {
    pub random_id: SlideId,
    pub presentation_name: String,
    pub slide_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub presentation_name: String,
    pub random_id: SlideId,
    pub slide_order: usize,
}

/// Remote slide store.
pub trait SlideBackend: Send + Sync {
    fn create_presentation(&self, request: CreatePresentationRequest) -> BoxFuture<'_, BackendResult<()>>;

    fn create_slide(&self, request: CreateSlideRequest) -> BoxFuture<'_, BackendResult<()>>;

    fn update_slide(&self, request: UpdateSlideRequest) -> BoxFuture<'_, BackendResult<()>>;

    fn delete_slide(&self, presentation_name: &str, random_id: &str) -> BoxFuture<'_, BackendResult<()>>;

    fn update_order(&self, request: UpdateOrderRequest) -> BoxFuture<'_, BackendResult<()>>;
}

/// Encode PNG bytes as `slideData`.
pub fn encode_slide_image(png: &[u8]) -> String {
    STANDARD.encode(png)
}

/// Drop a `data:<mime>;base64,` prefix, if present.
pub fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload;
        }
    }
    data
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_names() {
        let request = CreateSlideRequest {
            random_id: "slide-1".into(),
            presentation_name: "Sunday".into(),
            slide_order: 3,
            slide_data: "AAAA".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["randomId"], "slide-1");
        assert_eq!(json["presentationName"], "Sunday");
        assert_eq!(json["slideOrder"], 3);
        assert_eq!(json["slideData"], "AAAA");

        let update = serde_json::to_value(UpdateSlideRequest {
            random_id: "slide-1".into(),
            presentation_name: "Sunday".into(),
            slide_data: "AAAA".into(),
        })
        .unwrap();
        assert!(update.get("slideOrder").is_none());
    }

    #[test]
    fn test_image_encoding() {
        assert_eq!(encode_slide_image(&[0x89, b'P', b'N', b'G']), "iVBORw==");
        assert_eq!(strip_data_url("data:image/png;base64,iVBORw=="), "iVBORw==");
        assert_eq!(strip_data_url("iVBORw=="), "iVBORw==");
    }
}

//! HTTP implementation of the slide backend.

use crate::error::AppError;
use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;
use versedeck_core::backend::{
    BackendError, BackendResult, CreatePresentationRequest, CreateSlideRequest, SlideBackend, UpdateOrderRequest,
    UpdateSlideRequest,
};
use versedeck_core::storage::BoxFuture;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the presentations REST API rooted at `base_url`.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let invalid = |reason: String| AppError::InvalidApiUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        let client = Client::builder()
            .user_agent(concat!("versedeck/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| invalid(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(request: RequestBuilder) -> BackendResult<()> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl SlideBackend for HttpBackend {
    fn create_presentation(&self, request: CreatePresentationRequest) -> BoxFuture<'_, BackendResult<()>> {
        let builder = self.client.post(self.endpoint(&["presentations"])).json(&request);
        Box::pin(Self::send(builder))
    }

    fn create_slide(&self, request: CreateSlideRequest) -> BoxFuture<'_, BackendResult<()>> {
        let builder = self
            .client
            .post(self.endpoint(&["presentations", "slide"]))
            .json(&request);
        Box::pin(Self::send(builder))
    }

    fn update_slide(&self, request: UpdateSlideRequest) -> BoxFuture<'_, BackendResult<()>> {
        let builder = self
            .client
            .put(self.endpoint(&["presentations", "slide"]))
            .json(&request);
        Box::pin(Self::send(builder))
    }

    fn delete_slide(&self, presentation_name: &str, random_id: &str) -> BoxFuture<'_, BackendResult<()>> {
        let url = self.endpoint(&["presentations", "slide", presentation_name, random_id]);
        Box::pin(Self::send(self.client.delete(url)))
    }

    fn update_order(&self, request: UpdateOrderRequest) -> BoxFuture<'_, BackendResult<()>> {
        let builder = self
            .client
            .put(self.endpoint(&["presentations", "update-order"]))
            .json(&request);
        Box::pin(Self::send(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let backend = HttpBackend::new("https://slides.example.org/api/").unwrap();
        assert_eq!(
            backend.endpoint(&["presentations"]).as_str(),
            "https://slides.example.org/api/presentations"
        );
        assert_eq!(
            backend.endpoint(&["presentations", "update-order"]).as_str(),
            "https://slides.example.org/api/presentations/update-order"
        );
    }

    #[test]
    fn test_delete_path_is_encoded() {
        let backend = HttpBackend::new("http://localhost:8080").unwrap();
        let url = backend.endpoint(&["presentations", "slide", "Sunday Service", "slide-1"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/presentations/slide/Sunday%20Service/slide-1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(AppError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            HttpBackend::new("mailto:someone@example.org"),
            Err(AppError::InvalidApiUrl { .. })
        ));
    }
}

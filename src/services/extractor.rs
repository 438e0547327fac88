use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors from the extraction call. These never reach a caller of
/// `extract`; they are logged and degraded to an empty map.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the natural-language criteria extraction capability.
///
/// The provider is a black box behind a single endpoint: POST the free
/// text, get back a partial key/value criteria map. Extraction is
/// best-effort by contract; a timeout, transport fault, non-2xx status,
/// unparseable body, or absent configuration all collapse to an empty
/// map and never surface as a user-facing error.
pub struct CriteriaExtractor {
    endpoint: Option<String>,
    api_key: Option<String>,
    client: Client,
}

impl CriteriaExtractor {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            api_key,
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Extract structured criteria from free text. Total: always returns
    /// a map, empty on any kind of failure.
    pub async fn extract(&self, text: &str) -> Map<String, Value> {
        let Some(endpoint) = &self.endpoint else {
            // Not configured: same empty-criteria behavior, quieter signal.
            tracing::debug!("Extractor not configured, skipping extraction");
            return Map::new();
        };

        match self.try_extract(endpoint, text).await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Extraction degraded, falling back to empty criteria: {}", e);
                Map::new()
            }
        }
    }

    async fn try_extract(&self, endpoint: &str, text: &str) -> Result<Map<String, Value>, ExtractorError> {
        let mut request = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "text": text }));

        if let Some(api_key) = &self.api_key {
            request = request.header("X-Api-Key", api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ExtractorError::ApiError(format!(
                "Extraction request failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        // Providers either return the criteria map directly or wrap it
        // under a "criteria" key.
        let map = json
            .get("criteria")
            .and_then(Value::as_object)
            .cloned()
            .or_else(|| json.as_object().cloned())
            .ok_or_else(|| ExtractorError::InvalidResponse("Expected a JSON object".into()))?;

        tracing::debug!("Extracted {} criteria fields", map.len());

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_extractor_returns_empty() {
        let extractor = CriteriaExtractor::new(None, None, 5);
        assert!(!extractor.is_configured());

        let map = extractor.extract("armador central brasileiro").await;
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_successful_extraction() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"position": "Armador Central", "heightMin": 190}"#)
            .create_async()
            .await;

        let extractor =
            CriteriaExtractor::new(Some(format!("{}/extract", server.url())), None, 5);
        let map = extractor.extract("armador central acima de 190cm").await;

        mock.assert_async().await;
        assert_eq!(map.get("position").and_then(|v| v.as_str()), Some("Armador Central"));
        assert_eq!(map.get("heightMin").and_then(|v| v.as_u64()), Some(190));
    }

    #[tokio::test]
    async fn test_wrapped_criteria_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"criteria": {"nationality": "Brasil"}}"#)
            .create_async()
            .await;

        let extractor =
            CriteriaExtractor::new(Some(format!("{}/extract", server.url())), None, 5);
        let map = extractor.extract("brasileiro").await;

        assert_eq!(map.get("nationality").and_then(|v| v.as_str()), Some("Brasil"));
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/extract")
            .with_status(500)
            .create_async()
            .await;

        let extractor =
            CriteriaExtractor::new(Some(format!("{}/extract", server.url())), None, 5);
        let map = extractor.extract("anything").await;

        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_body_degrades_to_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[1, 2, 3]")
            .create_async()
            .await;

        let extractor =
            CriteriaExtractor::new(Some(format!("{}/extract", server.url())), None, 5);
        let map = extractor.extract("anything").await;

        assert!(map.is_empty());
    }
}

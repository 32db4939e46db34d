//! Google Cloud Vision label detection over the REST `images:annotate` API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

use super::auth::{ServiceAccountTokens, TokenProvider};
use super::provider::{ImageInput, TagProvider};
use crate::config::VisionConfig;
use crate::error::ProviderError;
use crate::types::TagOutcome;

/// Label-detection client for Google Cloud Vision.
pub struct VisionClient {
    endpoint: String,
    max_results: u32,
    timeout: Option<Duration>,
    tokens: Box<dyn TokenProvider>,
    client: reqwest::Client,
}

impl VisionClient {
    pub fn new(config: &VisionConfig, tokens: Box<dyn TokenProvider>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            max_results: config.max_results,
            timeout: config.timeout_secs.map(Duration::from_secs),
            tokens,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client that authenticates with a service-account key file.
    pub fn from_key_file(config: &VisionConfig, key_path: &Path) -> Result<Self, ProviderError> {
        let tokens = ServiceAccountTokens::from_file(key_path, &config.scope)?;
        Ok(Self::new(config, Box::new(tokens)))
    }

    async fn annotate(&self, image: &[u8]) -> Result<Vec<String>, ProviderError> {
        let token = self.tokens.access_token().await?;
        let start = Instant::now();

        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: ImageInput::from_bytes(image).data,
                },
                features: vec![Feature {
                    kind: "LABEL_DETECTION",
                    max_results: self.max_results,
                }],
            }],
        };

        let mut request = self.client.post(&self.endpoint).bearer_auth(token).json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await.map_err(ProviderError::from_request)?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let labels = parse_labels(&text)?;
        tracing::debug!(
            "Vision returned {} label(s) in {}ms",
            labels.len(),
            start.elapsed().as_millis()
        );
        Ok(labels)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: VisionImage,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct VisionImage {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

// --- Response types ---

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
struct AnnotateImageResponse {
    #[serde(default, rename = "labelAnnotations")]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// Pull label descriptions out of an `images:annotate` response body, in
/// response order.
pub(crate) fn parse_labels(body: &str) -> Result<Vec<String>, ProviderError> {
    let parsed: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedJson(e.to_string()))?;

    let Some(first) = parsed.responses.into_iter().next() else {
        return Ok(Vec::new());
    };

    if let Some(status) = first.error.filter(|s| !s.message.is_empty()) {
        return Err(ProviderError::Service(format!(
            "Google Vision API error: {}",
            status.message
        )));
    }

    Ok(first
        .label_annotations
        .into_iter()
        .map(|label| label.description)
        .filter(|d| !d.is_empty())
        .collect())
}

#[async_trait]
impl TagProvider for VisionClient {
    fn name(&self) -> &str {
        "google-vision"
    }

    async fn detect_labels(&self, image: &[u8]) -> TagOutcome {
        match self.annotate(image).await {
            Ok(labels) => TagOutcome::from_labels(labels),
            Err(e) => {
                tracing::warn!("Error getting tags from Google Vision: {e}");
                TagOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_in_order() {
        let body = r#"{
            "responses": [{
                "labelAnnotations": [
                    {"mid": "/m/01", "description": "Dog", "score": 0.97},
                    {"mid": "/m/02", "description": "Beach", "score": 0.91},
                    {"mid": "/m/03", "description": "Sand", "score": 0.55}
                ]
            }]
        }"#;
        assert_eq!(parse_labels(body).unwrap(), vec!["Dog", "Beach", "Sand"]);
    }

    #[test]
    fn test_parse_labels_empty_response() {
        assert!(parse_labels(r#"{"responses": [{}]}"#).unwrap().is_empty());
        assert!(parse_labels(r#"{"responses": []}"#).unwrap().is_empty());
        assert!(parse_labels("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_labels_service_error() {
        let body = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        let err = parse_labels(body).unwrap_err();
        assert_eq!(
            err,
            ProviderError::Service("Google Vision API error: Bad image data.".to_string())
        );
    }

    #[test]
    fn test_parse_labels_empty_error_message_is_ignored() {
        let body = r#"{"responses": [{"error": {"message": ""},
                        "labelAnnotations": [{"description": "Cat"}]}]}"#;
        assert_eq!(parse_labels(body).unwrap(), vec!["Cat"]);
    }

    #[test]
    fn test_parse_labels_malformed() {
        assert!(matches!(
            parse_labels("<html>oops</html>"),
            Err(ProviderError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: "AAEC".to_string(),
                },
                features: vec![Feature {
                    kind: "LABEL_DETECTION",
                    max_results: 10,
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["requests"][0]["image"]["content"], "AAEC");
        assert_eq!(json["requests"][0]["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(json["requests"][0]["features"][0]["maxResults"], 10);
    }
}

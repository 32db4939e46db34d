//! Astica Vision captioning via its `describe` endpoint.
//!
//! The key travels in the JSON body (`tkn`), not in a header.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

use super::provider::{resolve_env_var, DescriptionProvider, ImageInput};
use crate::config::DescribeConfig;
use crate::error::ProviderError;
use crate::types::DescriptionOutcome;

/// Astica description client.
pub struct AsticaClient {
    endpoint: String,
    api_key: Option<String>,
    model_version: String,
    vision_params: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AsticaClient {
    /// Create a client, resolving `${ENV_VAR}` in the configured key.
    pub fn new(config: &DescribeConfig) -> Self {
        Self::with_api_key(config, resolve_env_var(&config.api_key))
    }

    pub fn with_api_key(config: &DescribeConfig, api_key: Option<String>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key,
            model_version: config.model_version.clone(),
            vision_params: config.vision_params.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    async fn request(&self, image: &ImageInput) -> Result<DescriptionOutcome, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let start = Instant::now();

        let body = AsticaRequest {
            tkn: api_key,
            model_version: &self.model_version,
            input: &image.data,
            vision_params: &self.vision_params,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ProviderError::from_request)?;

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

        let outcome = interpret_response(&text)?;
        tracing::debug!("Astica answered in {}ms", start.elapsed().as_millis());
        Ok(outcome)
    }
}

#[derive(Serialize)]
struct AsticaRequest<'a> {
    tkn: &'a str,
    #[serde(rename = "modelVersion")]
    model_version: &'a str,
    input: &'a str,
    #[serde(rename = "visionParams")]
    vision_params: &'a str,
}

/// Interpret a 2xx body from the describe endpoint.
///
/// A `status` of `"error"` or any non-null `error` field is a service error.
/// `caption` may be a plain string or an object carrying `text`.
pub(crate) fn interpret_response(body: &str) -> Result<DescriptionOutcome, ProviderError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedJson(e.to_string()))?;
    let Some(obj) = value.as_object() else {
        return Err(ProviderError::MalformedJson(
            "expected a JSON object".to_string(),
        ));
    };

    // `"error": null` accompanies successful answers and is not a failure.
    let error = obj.get("error").filter(|e| !e.is_null());
    let status_error = obj.get("status").and_then(Value::as_str) == Some("error");
    if error.is_some() || status_error {
        let message = match error {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Unknown Astica API error".to_string(),
        };
        return Err(ProviderError::Service(message));
    }

    let caption = match obj.get("caption") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(c)) => c.get("text").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    Ok(DescriptionOutcome::from_caption(caption))
}

#[async_trait]
impl DescriptionProvider for AsticaClient {
    fn name(&self) -> &str {
        "astica"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn describe(&self, image: &ImageInput) -> DescriptionOutcome {
        match self.request(image).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    ProviderError::MissingApiKey => {
                        tracing::error!("ASTICA_API_KEY environment variable not set")
                    }
                    other => tracing::warn!("Astica request failed: {other}"),
                }
                DescriptionOutcome::Failed(e)
            }
        }
    }
}

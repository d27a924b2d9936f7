//! REST client for the generateContent endpoint.
//!
//! Wraps the generation service's HTTP API using [`reqwest`]. One
//! [`GeminiApi::generate`] call is exactly one request; retries happen
//! in [`crate::retry`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::GeminiConfig;
use crate::protocol::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData,
    InlineDataPart, Part, TextPart,
};
use crate::service::{GenerateRequest, GenerateService, GeneratedImage};

/// HTTP client for the generation service.
pub struct GeminiApi {
    client: reqwest::Client,
    config: GeminiConfig,
}

/// Errors from a single generation call. Every variant is treated as
/// retryable by the layer above.
#[derive(Debug, thiserror::Error)]
pub enum GeminiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.), or the
    /// response body was not valid JSON of the expected shape.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response without any inline image payload.
    #[error("No image data in API response")]
    MissingImage,

    /// The inline payload could not be base64-decoded.
    #[error("Malformed image payload: {0}")]
    Payload(String),
}

impl GeminiApi {
    /// Create a new API client.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        )
    }

    /// Build the wire request: prompt text first, then each reference
    /// image as base64 inline data, in order.
    fn build_body(request: &GenerateRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(1 + request.references.len());
        parts.push(Part::Text(TextPart {
            text: request.prompt.clone(),
        }));
        for reference in &request.references {
            parts.push(Part::InlineData(InlineDataPart {
                inline_data: InlineData {
                    mime_type: reference.mime_type.clone(),
                    data: BASE64.encode(&reference.data),
                },
            }));
        }
        GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig::image(),
        }
    }

    /// Ensure the response has a success status code, capturing status
    /// and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeminiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerateService for GeminiApi {
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedImage, GeminiApiError> {
        let body = Self::build_body(request);

        tracing::debug!(
            request_id = %request.id,
            references = request.references.len(),
            "Submitting generation request",
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<GenerateContentResponse>().await?;

        let inline = parsed
            .first_inline_image()
            .ok_or(GeminiApiError::MissingImage)?;
        let data = BASE64
            .decode(&inline.data)
            .map_err(|e| GeminiApiError::Payload(e.to_string()))?;

        tracing::debug!(
            request_id = %request.id,
            mime_type = %inline.mime_type,
            bytes = data.len(),
            "Generation request succeeded",
        );

        Ok(GeneratedImage {
            mime_type: inline.mime_type.clone(),
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ReferenceImage;

    #[test]
    fn body_puts_prompt_before_references() {
        let request = GenerateRequest::new("a quiet street").with_references(vec![
            ReferenceImage {
                mime_type: "image/jpeg".to_string(),
                data: vec![1, 2, 3],
            },
            ReferenceImage {
                mime_type: "image/png".to_string(),
                data: vec![4],
            },
        ]);

        let body = GeminiApi::build_body(&request);
        let json = serde_json::to_value(&body).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "a quiet street");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], BASE64.encode([1u8, 2, 3]));
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let mut config = GeminiConfig::new("secret");
        config.base_url = "http://localhost:9999".to_string();
        let api = GeminiApi::new(config);
        let endpoint = api.endpoint();
        assert!(endpoint.starts_with("http://localhost:9999/v1beta/models/"));
        assert!(endpoint.ends_with(":generateContent?key=secret"));
    }
}

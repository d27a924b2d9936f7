//! Connection configuration for the generation service.

use std::env;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default image-capable model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Configuration for [`crate::api::GeminiApi`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// Model name used in the request path.
    pub model: String,
}

/// Errors building a [`GeminiConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum GeminiConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

impl GeminiConfig {
    /// Configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// `GEMINI_API_KEY` is required; `GEMINI_BASE_URL` and
    /// `GEMINI_MODEL` override the defaults when set.
    pub fn from_env() -> Result<Self, GeminiConfigError> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| GeminiConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.model = model;
        }
        Ok(config)
    }
}

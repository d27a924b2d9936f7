//! The generation-service seam.
//!
//! Orchestration code depends on [`GenerateService`], not on the
//! concrete HTTP client, so tests can substitute deterministic or
//! failing services.

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::GeminiApiError;

/// A reference image attached to a generation request, tagged with its
/// encoding.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One logical generation request: a prompt plus the ordered reference
/// images conditioning it.
///
/// The `id` is a correlation id for logs and progress events; it has no
/// meaning to the external service.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub id: Uuid,
    pub prompt: String,
    pub references: Vec<ReferenceImage>,
}

impl GenerateRequest {
    /// Request with no reference images.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            references: Vec::new(),
        }
    }

    /// Attach reference images, replacing any already present.
    pub fn with_references(mut self, references: Vec<ReferenceImage>) -> Self {
        self.references = references;
        self
    }
}

/// Raw generated image bytes as returned by the service.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One call to the external generation endpoint.
///
/// A single invocation makes exactly one service call; retry policy
/// lives in [`crate::retry`], above this trait.
#[async_trait]
pub trait GenerateService: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedImage, GeminiApiError>;
}

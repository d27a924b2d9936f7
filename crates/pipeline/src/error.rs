//! Error type for the orchestration layer.
//!
//! Every multi-step operation is structured so that failure before the
//! atomic commit point leaves prior state untouched. Callers can rely
//! on that split: [`PipelineError::Consistency`] is the only variant
//! raised by a failed batch commit; every other variant means nothing
//! was changed by the failing step.

use inkstrip_core::error::CoreError;
use inkstrip_core::types::DbId;
use inkstrip_gemini::GenerateError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The generation service failed after exhausting its retry budget.
    /// Retries are fully contained below this boundary; this is
    /// terminal.
    #[error(transparent)]
    Generation(#[from] GenerateError),

    /// Generated bytes could not be decoded. Fatal for the affected
    /// image, never retried.
    #[error("Failed to decode generated image: {0}")]
    Decode(String),

    /// An atomic batch could not be committed. Nothing was applied;
    /// retry the whole logical operation.
    #[error("Atomic batch could not be committed: {0}")]
    Consistency(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound { entity, id } => PipelineError::NotFound { entity, id },
            CoreError::Validation(msg) => PipelineError::Validation(msg),
            CoreError::Conflict(msg) => PipelineError::Validation(msg),
            CoreError::Internal(msg) => PipelineError::Internal(msg),
        }
    }
}

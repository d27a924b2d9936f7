//! Client for the external image-generation service.
//!
//! [`api::GeminiApi`] speaks the generateContent wire format over
//! HTTPS; [`retry::generate_with_retry`] wraps any
//! [`service::GenerateService`] with bounded retries and exponential
//! backoff. Callers above this crate only ever see success or a
//! terminal [`retry::GenerateError`].

pub mod api;
pub mod config;
pub mod protocol;
pub mod retry;
pub mod service;

pub use api::{GeminiApi, GeminiApiError};
pub use config::GeminiConfig;
pub use retry::{generate_with_retry, GenerateError, RetryConfig, RetryNotice};
pub use service::{GenerateRequest, GenerateService, GeneratedImage, ReferenceImage};

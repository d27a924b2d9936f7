//! Generation orchestration for the inkstrip studio.
//!
//! Two managers own the caller-facing operations:
//! [`character::CharacterAssetManager`] keeps a character's portrait
//! set consistent with its fixed slot templates, and
//! [`panel::PanelSequenceManager`] keeps an episode's panels in
//! contiguous reading order. Both assemble reference context
//! ([`reference`]), call the generation service with bounded retries,
//! and normalize output ([`normalize`]) before any write.

pub mod character;
pub mod error;
pub mod normalize;
pub mod panel;
pub mod reference;

pub use character::CharacterAssetManager;
pub use error::PipelineError;
pub use normalize::{normalize, NormalizeConfig, NormalizedImage};
pub use panel::PanelSequenceManager;

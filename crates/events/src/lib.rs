//! Progress and lifecycle events for the inkstrip studio.
//!
//! The pipeline publishes [`StudioEvent`]s (retry progress, portrait
//! generation lifecycle, panel mutations) on an in-process
//! [`EventBus`]. The excluded UI layer subscribes to surface progress
//! to users.

pub mod bus;

pub use bus::{EventBus, StudioEvent};

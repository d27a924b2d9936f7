//! Portrait-set state machine for a character.
//!
//! `Uninitialized -> Generating -> Ready | ReadyDegraded`, with
//! re-entry into `Generating` allowed from either terminal state
//! (regeneration). A character in `ReadyDegraded` holds fewer than
//! [`crate::prompts::PORTRAIT_SLOT_COUNT`] images after a run with
//! partial failures; it stays degraded until the next regeneration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prompts::PORTRAIT_SLOT_COUNT;

/// Lifecycle status of a character's portrait set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortraitSetStatus {
    Uninitialized,
    Generating,
    Ready,
    ReadyDegraded,
}

impl PortraitSetStatus {
    /// Database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PortraitSetStatus::Uninitialized => "uninitialized",
            PortraitSetStatus::Generating => "generating",
            PortraitSetStatus::Ready => "ready",
            PortraitSetStatus::ReadyDegraded => "ready_degraded",
        }
    }

    /// Parse the database representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "uninitialized" => Ok(PortraitSetStatus::Uninitialized),
            "generating" => Ok(PortraitSetStatus::Generating),
            "ready" => Ok(PortraitSetStatus::Ready),
            "ready_degraded" => Ok(PortraitSetStatus::ReadyDegraded),
            other => Err(CoreError::Validation(format!(
                "Unknown portrait set status '{other}'"
            ))),
        }
    }

    /// Whether a generation run may begin from this state.
    ///
    /// `Generating` itself is excluded: at most one run per character is
    /// in flight at a time (caller contract).
    pub fn can_begin_generation(self) -> bool {
        !matches!(self, PortraitSetStatus::Generating)
    }
}

/// Status after a generation run that produced `stored` images out of
/// [`PORTRAIT_SLOT_COUNT`] slots.
pub fn classify_result(stored: usize) -> PortraitSetStatus {
    if stored >= PORTRAIT_SLOT_COUNT {
        PortraitSetStatus::Ready
    } else {
        PortraitSetStatus::ReadyDegraded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Character entity model and DTOs.

use inkstrip_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A character row from the `characters` table.
///
/// `image_status` persists the portrait-set state machine
/// (`uninitialized | generating | ready | ready_degraded`); parse it
/// with `inkstrip_core::portrait_state::PortraitSetStatus::parse`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub series_id: DbId,
    pub name: String,
    /// Free text driving the portrait prompt templates.
    pub description: String,
    pub image_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new character. Created with zero portraits;
/// images are populated asynchronously afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub series_id: DbId,
    pub name: String,
    pub description: String,
}

/// DTO for updating a character's metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub description: Option<String>,
}

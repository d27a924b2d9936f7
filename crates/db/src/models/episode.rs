//! Episode entity model and DTOs.

use inkstrip_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An episode row from the `episodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Episode {
    pub id: DbId,
    pub series_id: DbId,
    pub title: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new episode.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEpisode {
    pub series_id: DbId,
    pub title: String,
}

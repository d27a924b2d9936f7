//! Series entity model and DTOs.

use inkstrip_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A series row from the `series` table.
///
/// `style` is free text injected into every prompt generated for this
/// series' characters and panels.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Series {
    pub id: DbId,
    pub owner_id: String,
    pub title: String,
    pub style: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new series.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSeries {
    pub owner_id: String,
    pub title: String,
    pub style: String,
}

/// DTO for updating a series. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSeries {
    pub title: Option<String>,
    pub style: Option<String>,
}

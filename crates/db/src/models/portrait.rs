//! Portrait entity model and DTOs.

use inkstrip_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A portrait row from the `portraits` table: one normalized image in
/// one of a character's fixed slots.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Portrait {
    pub id: DbId,
    pub character_id: DbId,
    pub slot_index: i32,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: Timestamp,
}

/// DTO for inserting one portrait slot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePortrait {
    pub character_id: DbId,
    pub slot_index: i32,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

//! Panel entity model and DTOs.

use inkstrip_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A panel row from the `panels` table.
///
/// For a fixed `episode_id` the set of `sort_order` values is exactly
/// `{0..count-1}` at the end of every committed operation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Panel {
    pub id: DbId,
    pub episode_id: DbId,
    pub sort_order: i32,
    pub scene_description: String,
    pub dialogue: String,
    /// Characters present in the panel, in user-selected order.
    pub character_ids: Vec<DbId>,
    pub mime_type: String,
    pub image_data: Vec<u8>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Content fields of a panel, shared by append and edit paths. The
/// panel's position is never part of this DTO: appends compute it,
/// edits preserve it.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelContent {
    pub scene_description: String,
    pub dialogue: String,
    pub character_ids: Vec<DbId>,
    pub mime_type: String,
    pub image_data: Vec<u8>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

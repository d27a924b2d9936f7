//! Repository for the `panels` table.
//!
//! Owns the ordering invariant at the storage level: appends compute
//! `sort_order` inside the insert transaction, deletes renumber the
//! surviving siblings in the same atomic batch.

use inkstrip_core::ordering;
use inkstrip_core::types::DbId;
use sqlx::PgPool;

use crate::batch::{BatchStatement, WriteBatch};
use crate::models::panel::{Panel, PanelContent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, episode_id, sort_order, scene_description, dialogue, character_ids, \
     mime_type, image_data, width, height, created_at, updated_at";

/// Provides CRUD operations for panels plus delete-with-renumber.
pub struct PanelRepo;

impl PanelRepo {
    /// Append a panel to an episode, returning the created row.
    ///
    /// `sort_order` is the current panel count, computed inside the
    /// insert transaction.
    pub async fn create(
        pool: &PgPool,
        episode_id: DbId,
        content: &PanelContent,
    ) -> Result<Panel, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM panels WHERE episode_id = $1")
            .bind(episode_id)
            .fetch_one(&mut *tx)
            .await?;
        let sort_order = ordering::append_order(count.0 as usize);

        let query = format!(
            "INSERT INTO panels
                (episode_id, sort_order, scene_description, dialogue, character_ids,
                 mime_type, image_data, width, height)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let panel = sqlx::query_as::<_, Panel>(&query)
            .bind(episode_id)
            .bind(sort_order)
            .bind(&content.scene_description)
            .bind(&content.dialogue)
            .bind(&content.character_ids)
            .bind(&content.mime_type)
            .bind(&content.image_data)
            .bind(content.width)
            .bind(content.height)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(panel)
    }

    /// Find a panel by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Panel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM panels WHERE id = $1");
        sqlx::query_as::<_, Panel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all panels of an episode in reading order.
    pub async fn list_by_episode(
        pool: &PgPool,
        episode_id: DbId,
    ) -> Result<Vec<Panel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM panels WHERE episode_id = $1 ORDER BY sort_order ASC"
        );
        sqlx::query_as::<_, Panel>(&query)
            .bind(episode_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a panel's content fields, preserving its `sort_order`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        content: &PanelContent,
    ) -> Result<Option<Panel>, sqlx::Error> {
        let query = format!(
            "UPDATE panels SET
                scene_description = $2,
                dialogue = $3,
                character_ids = $4,
                mime_type = $5,
                image_data = $6,
                width = $7,
                height = $8,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Panel>(&query)
            .bind(id)
            .bind(&content.scene_description)
            .bind(&content.dialogue)
            .bind(&content.character_ids)
            .bind(&content.mime_type)
            .bind(&content.image_data)
            .bind(content.width)
            .bind(content.height)
            .fetch_optional(pool)
            .await
    }

    /// Delete a panel and renumber its surviving siblings as one atomic
    /// batch.
    ///
    /// The delete is staged first, then the order shifts in ascending
    /// order, so each update moves a row into a slot the batch has
    /// already freed. Returns `false` if the panel does not exist.
    pub async fn delete_with_renumber(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let Some(panel) = Self::find_by_id(pool, id).await? else {
            return Ok(false);
        };

        let siblings: Vec<(DbId, i32)> = sqlx::query_as(
            "SELECT id, sort_order FROM panels
             WHERE episode_id = $1 AND id != $2
             ORDER BY sort_order ASC",
        )
        .bind(panel.episode_id)
        .bind(id)
        .fetch_all(pool)
        .await?;

        let plan = ordering::renumber_after_removal(&siblings);

        let mut batch = WriteBatch::new();
        batch.stage(BatchStatement::new("DELETE FROM panels WHERE id = $1").bind(id));
        for (panel_id, new_order) in &plan {
            batch.stage(
                BatchStatement::new("UPDATE panels SET sort_order = $2 WHERE id = $1")
                    .bind(*panel_id)
                    .bind(*new_order),
            );
        }
        batch.commit(pool).await?;

        tracing::info!(
            panel_id = id,
            episode_id = panel.episode_id,
            renumbered = plan.len(),
            "Panel deleted and siblings renumbered",
        );
        Ok(true)
    }
}

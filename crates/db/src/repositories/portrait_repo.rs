//! Repository for the `portraits` table.

use inkstrip_core::types::DbId;
use sqlx::PgPool;

use crate::models::portrait::{CreatePortrait, Portrait};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, character_id, slot_index, mime_type, data, width, height, created_at";

/// Provides read and atomic-replace operations for portrait sets.
pub struct PortraitRepo;

impl PortraitRepo {
    /// List a character's portraits in ascending slot order.
    pub async fn list_by_character(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Vec<Portrait>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM portraits
             WHERE character_id = $1
             ORDER BY slot_index ASC"
        );
        sqlx::query_as::<_, Portrait>(&query)
            .bind(character_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a character's whole portrait set in one transaction.
    ///
    /// Deletes every existing row for the character and inserts the new
    /// set. Readers never observe a mixture of old and new slots.
    pub async fn replace_set(
        pool: &PgPool,
        character_id: DbId,
        portraits: &[CreatePortrait],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM portraits WHERE character_id = $1")
            .bind(character_id)
            .execute(&mut *tx)
            .await?;

        for portrait in portraits {
            sqlx::query(
                "INSERT INTO portraits (character_id, slot_index, mime_type, data, width, height)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(character_id)
            .bind(portrait.slot_index)
            .bind(&portrait.mime_type)
            .bind(&portrait.data)
            .bind(portrait.width)
            .bind(portrait.height)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            character_id,
            slots = portraits.len(),
            "Portrait set replaced",
        );
        Ok(())
    }
}

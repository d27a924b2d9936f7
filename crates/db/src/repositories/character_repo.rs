//! Repository for the `characters` table.

use inkstrip_core::types::DbId;
use sqlx::PgPool;

use crate::batch::{BatchStatement, WriteBatch};
use crate::models::character::{Character, CreateCharacter, UpdateCharacter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, name, description, image_status, created_at, updated_at";

/// Provides CRUD operations for characters plus the cascading delete.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    ///
    /// `image_status` starts at its default (`uninitialized`); portraits
    /// are populated asynchronously after creation.
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (series_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.series_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a character by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all characters of a series, ordered by name ascending.
    pub async fn list_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters WHERE series_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(series_id)
            .fetch_all(pool)
            .await
    }

    /// Update a character's metadata. Only non-`None` fields in `input`
    /// are applied. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Set the portrait-set status. Returns `true` if a row was updated.
    pub async fn set_image_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE characters SET image_status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a character and all of its portraits as one atomic batch.
    ///
    /// An interruption between the two deletes can never leave orphaned
    /// portraits: both statements commit together or not at all.
    pub async fn delete_with_portraits(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        let mut batch = WriteBatch::new();
        batch.stage(BatchStatement::new("DELETE FROM portraits WHERE character_id = $1").bind(id));
        batch.stage(BatchStatement::new("DELETE FROM characters WHERE id = $1").bind(id));
        batch.commit(pool).await?;

        tracing::info!(character_id = id, "Character and portraits deleted");
        Ok(())
    }
}

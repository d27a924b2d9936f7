//! Repository for the `series` table.

use inkstrip_core::types::DbId;
use sqlx::PgPool;

use crate::models::series::{CreateSeries, Series, UpdateSeries};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, style, created_at, updated_at";

/// Provides CRUD operations for series.
pub struct SeriesRepo;

impl SeriesRepo {
    /// Insert a new series, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSeries) -> Result<Series, sqlx::Error> {
        let query = format!(
            "INSERT INTO series (owner_id, title, style)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(&input.owner_id)
            .bind(&input.title)
            .bind(&input.style)
            .fetch_one(pool)
            .await
    }

    /// Find a series by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Series>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM series WHERE id = $1");
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all series owned by a user, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<Series>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM series WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a series. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSeries,
    ) -> Result<Option<Series>, sqlx::Error> {
        let query = format!(
            "UPDATE series SET
                title = COALESCE($2, title),
                style = COALESCE($3, style),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.style)
            .fetch_optional(pool)
            .await
    }
}

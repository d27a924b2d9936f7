//! Repository for the `episodes` table.

use inkstrip_core::types::DbId;
use sqlx::PgPool;

use crate::models::episode::{CreateEpisode, Episode};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, title, created_at";

/// Provides CRUD operations for episodes.
pub struct EpisodeRepo;

impl EpisodeRepo {
    /// Insert a new episode, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEpisode) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (series_id, title)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(input.series_id)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    /// Find an episode by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all episodes of a series, oldest first.
    pub async fn list_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes WHERE series_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(series_id)
            .fetch_all(pool)
            .await
    }
}

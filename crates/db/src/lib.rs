//! Persistence layer: Postgres models, repositories, and the atomic
//! write-batch abstraction.
//!
//! The store contract is deliberately narrow: point reads, equality
//! filters on a foreign key, ordered iteration by a numeric field, and
//! all-or-nothing multi-statement batches ([`batch::WriteBatch`]).

use sqlx::postgres::PgPoolOptions;

pub mod batch;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

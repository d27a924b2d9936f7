//! Atomic multi-statement write batch.
//!
//! [`WriteBatch`] gives cascading deletes and renumbering a minimal
//! stage/commit interface: stage any number of statements, then commit
//! them inside a single transaction: either every staged statement
//! applies or none do. Callers never touch the underlying transaction
//! API.

use inkstrip_core::types::DbId;
use sqlx::PgPool;

/// A bind parameter for a staged statement.
#[derive(Debug, Clone)]
pub enum BatchValue {
    BigInt(i64),
    Int(i32),
    Text(String),
    Bytes(Vec<u8>),
    IdArray(Vec<DbId>),
}

impl From<i64> for BatchValue {
    fn from(v: i64) -> Self {
        BatchValue::BigInt(v)
    }
}

impl From<i32> for BatchValue {
    fn from(v: i32) -> Self {
        BatchValue::Int(v)
    }
}

impl From<String> for BatchValue {
    fn from(v: String) -> Self {
        BatchValue::Text(v)
    }
}

impl From<&str> for BatchValue {
    fn from(v: &str) -> Self {
        BatchValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for BatchValue {
    fn from(v: Vec<u8>) -> Self {
        BatchValue::Bytes(v)
    }
}

impl From<Vec<DbId>> for BatchValue {
    fn from(v: Vec<DbId>) -> Self {
        BatchValue::IdArray(v)
    }
}

/// One staged SQL statement with its bound parameters.
#[derive(Debug, Clone)]
pub struct BatchStatement {
    sql: String,
    args: Vec<BatchValue>,
}

impl BatchStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Bind the next positional parameter.
    pub fn bind(mut self, value: impl Into<BatchValue>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// An all-or-nothing batch of write statements.
#[derive(Debug, Default)]
pub struct WriteBatch {
    statements: Vec<BatchStatement>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a statement for the next [`commit`](Self::commit).
    pub fn stage(&mut self, statement: BatchStatement) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Execute every staged statement inside one transaction.
    ///
    /// Statements run in staging order. Any failure rolls the whole
    /// batch back; nothing is partially applied.
    pub async fn commit(self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let count = self.statements.len();
        let mut tx = pool.begin().await?;

        for statement in self.statements {
            let BatchStatement { sql, args } = statement;
            let mut query = sqlx::query(&sql);
            for arg in args {
                query = match arg {
                    BatchValue::BigInt(v) => query.bind(v),
                    BatchValue::Int(v) => query.bind(v),
                    BatchValue::Text(v) => query.bind(v),
                    BatchValue::Bytes(v) => query.bind(v),
                    BatchValue::IdArray(v) => query.bind(v),
                };
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        tracing::debug!(statements = count, "Write batch committed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

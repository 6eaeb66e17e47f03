//! Transactional persistence of users, orders, and withdrawals. Every multi-statement
//! mutation opens an explicit `sqlx::Transaction` so the Store's callers never observe a
//! partially-applied balance change.
pub mod orders;
pub mod users;
pub mod withdraws;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub use orders::{AddOrderError, AddOrderOutcome};
pub use users::{AuthenticateError, RegisterError};
pub use withdraws::AddWithdrawError;

/// The connection pool is itself `Arc`-backed, so cloning a `Store` is cheap and every request
/// task can hold its own handle without additional locking.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn new(database_uri: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(database_uri)
            .await
            .context("connecting to database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        Ok(Self { pool })
    }

    /// Releases the connection pool. Safe to call once, after both the HTTP listener and the
    /// accrual poller have stopped issuing queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Error-classification helper so callers above the Store never need to know the database
    /// vendor: a Postgres unique-constraint violation is SQLSTATE `23505`.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
    }
}

//! Postgres persistence for escrow state: row types, one module per
//! table of free-function repositories, and the row-lock transaction
//! helpers every state-changing operation goes through.
//!
//! Callers are expected to open a [`sqlx::Transaction`], call
//! [`repo::escrow::get_escrow_for_update`] to take the row lock, make
//! their changes, and commit — exactly one transaction per
//! state-changing operation, per the concurrency model this crate
//! implements for.

pub mod error;
pub mod models;
pub mod repo;

pub use error::DbError;
pub use sqlx::PgPool;

/// Opens a connection pool against `database_url`, matching the
/// pool-construction style of the teacher's `RocksDB::open`.
pub async fn connect(database_url: &str) -> Result<PgPool, DbError> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
        .map_err(DbError::Sql)
}

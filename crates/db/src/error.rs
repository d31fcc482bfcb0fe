use thiserror::Error;

/// Errors surfaced by the Postgres repositories.
#[derive(Error, Debug)]
pub enum DbError {
    /// The underlying pool or query failed.
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A row expected to exist (by id, or locked for update) was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated — the second line of defense
    /// behind the application-level idempotency checks in
    /// `trustora_core::idempotency`.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A state transition rejected by `trustora_core::validate_transition`
    /// was attempted inside a repository call.
    #[error(transparent)]
    Core(#[from] trustora_core::CoreError),

    /// A stored JSON column failed to deserialize into its Rust type.
    #[error("corrupt json column: {0}")]
    Codec(String),
}

impl DbError {
    /// True if `err` is a Postgres unique-violation (`23505`).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sql(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

use thiserror::Error;

/// Storage errors. Any of these aborts the operation that hit it.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid date stored in database: {0}")]
    InvalidDate(String),
    #[error("invalid value stored in database: {0}")]
    InvalidState(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store lock poisoned by a panicked operation")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

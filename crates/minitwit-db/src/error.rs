use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness rule was violated (e.g. a taken username).
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Input the store refuses to persist (e.g. an empty message).
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Classify a failed write, turning SQLite constraint failures into
    /// [`StoreError::Constraint`].
    pub(crate) fn from_write(err: rusqlite::Error, what: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(what.to_string())
            }
            _ => StoreError::Sqlite(err),
        }
    }
}

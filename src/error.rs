use thiserror::Error;

/// Errors surfaced by the store layer.
///
/// Absence of a row is not an error: lookups return `Option` and flag
/// mutations return `bool`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Stale {entity} {id}: expected version {expected}, found {actual}")]
    Conflict {
        entity: &'static str,
        id: i64,
        expected: i64,
        actual: i64,
    },
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Maintenance routine {routine} failed: {source}")]
    Maintenance {
        routine: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_foreign_key_violation()
                    || db_err.is_unique_violation()
                    || db_err.is_check_violation() =>
            {
                StoreError::ConstraintViolation(db_err.message().to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

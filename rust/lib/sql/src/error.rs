use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// The database stayed locked past the busy timeout.
    #[error("database busy: {0}")]
    Busy(String),
}

impl SQLError {
    pub(crate) fn query(e: rusqlite::Error) -> Self {
        if is_busy(&e) {
            SQLError::Busy(e.to_string())
        } else {
            SQLError::Query(e.to_string())
        }
    }

    pub(crate) fn execution(e: rusqlite::Error) -> Self {
        if is_busy(&e) {
            SQLError::Busy(e.to_string())
        } else {
            SQLError::Execution(e.to_string())
        }
    }
}

fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked)
    )
}

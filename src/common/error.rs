use thiserror::Error;

/// Errors reported by the session manager.
///
/// Each variant maps to one class of failure: opening the store, running DDL,
/// running DML, running an arbitrary query, or calling an operation in the
/// wrong lifecycle state. Engine failures keep the underlying
/// [`rusqlite::Error`] as their source.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Opening or closing the store file failed.
    #[error("connection error: {0}")]
    Connection(#[source] rusqlite::Error),

    /// A schema operation (CREATE TABLE) was rejected by the engine.
    #[error("schema error: {0}")]
    Schema(#[source] rusqlite::Error),

    /// A data operation (INSERT) was rejected, e.g. a constraint violation.
    #[error("data error: {0}")]
    Data(#[source] rusqlite::Error),

    /// An arbitrary statement failed to prepare or execute.
    #[error("query error: {0}")]
    Query(#[source] rusqlite::Error),

    /// An operation was called while the manager was disconnected.
    #[error("not connected to a database")]
    NotConnected,

    /// The named table does not exist in the store.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The caller passed arguments the manager refuses outright,
    /// such as an empty column-definition list.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_engine_errors_keep_their_source() {
        let inner = rusqlite::Connection::open_in_memory()
            .unwrap()
            .execute("NOT VALID SQL", [])
            .unwrap_err();
        let err = DatabaseError::Query(inner);

        assert!(err.to_string().starts_with("query error:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_state_errors_have_no_source() {
        assert!(DatabaseError::NotConnected.source().is_none());
        assert_eq!(
            DatabaseError::TableNotFound("ghosts".to_string()).to_string(),
            "table not found: ghosts"
        );
    }
}

//! Database error types
//!
//! Errors raised by the adapters, and their translation into the
//! `PortError` that services see.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during entity store operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Record not found in the store
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// A record with the same key already exists
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// A stored document does not match its entity type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Schema setup failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::DuplicateEntry(format!("{} with id '{}' already exists", entity, id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Maps SQLx errors to specific variants by PostgreSQL error code
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                Some("23505") => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                _ => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError::SerializationError(error.to_string())
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound {
                entity_type: entity,
                id,
            },
            DatabaseError::DuplicateEntry(message) => PortError::Conflict { message },
            DatabaseError::SerializationError(message) => PortError::Transformation { message },
            DatabaseError::ConnectionFailed(message) => PortError::Connection {
                message,
                source: None,
            },
            DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
            // the borrowed mapping never yields SqlError, so this recurses once
            DatabaseError::SqlError(e) => PortError::from(DatabaseError::from(&e)),
            other => PortError::internal(other.to_string()),
        }
    }
}

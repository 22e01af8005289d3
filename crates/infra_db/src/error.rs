//! Database error types
//!
//! This module defines the error types that can occur during database operations,
//! and how they surface through the domain ports.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped onto the domain model
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Unit", "UNIT-123");
    /// assert!(error.to_string().contains("Unit"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        DatabaseError::CorruptRow(message.into())
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Maps SQLx errors onto DatabaseError variants by PostgreSQL error code
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(message),
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23514") => DatabaseError::ConstraintViolation(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound { entity_type: entity, id },
            DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
            DatabaseError::ForeignKeyViolation(message) | DatabaseError::ConstraintViolation(message) => {
                PortError::validation(message)
            }
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
                service: "postgres".to_string(),
            },
            other => PortError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_mapping() {
        let port: PortError = DatabaseError::not_found("Unit", "UNIT-1").into();
        assert!(port.is_not_found());

        let port: PortError = DatabaseError::DuplicateEntry("units_number_key".to_string()).into();
        assert!(matches!(port, PortError::Conflict { .. }));

        let port: PortError = DatabaseError::PoolExhausted.into();
        assert!(port.is_transient());

        let port: PortError = DatabaseError::corrupt("status 'lost'").into();
        assert!(matches!(port, PortError::Internal { .. }));
    }

    #[test]
    fn test_row_not_found() {
        let error = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(error.is_not_found());
        assert!(!error.is_constraint_violation());
    }
}

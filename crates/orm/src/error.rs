//! Error types for the ORM system
//!
//! Naming and configuration problems are reported before any SQL is issued;
//! driver failures are carried through as `ModelError::Database`.

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for ORM operations
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Database connection or query error raised by the driver
    #[error("Database error: {0}")]
    Database(String),

    /// Relationship configuration cannot be turned into pivot naming
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Table-name information needed for resolution is unavailable
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// A column expected on a result row is absent
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Query building error
    #[error("Query error: {0}")]
    Query(String),

    /// Connection setup error
    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

/// Error types for query builder operations
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Missing required fields
    #[error("Missing fields: {0}")]
    MissingFields(String),
}

impl From<QueryError> for ModelError {
    fn from(err: QueryError) -> Self {
        ModelError::Query(err.to_string())
    }
}

/// Error types for relationship operations
#[derive(Debug, Clone, Error)]
pub enum RelationshipError {
    /// Invalid relationship configuration
    #[error("Invalid relationship configuration: {0}")]
    InvalidConfiguration(String),
    /// Owner or related side has no usable table name
    #[error("Unresolvable table: {0}")]
    UnresolvableTable(String),
    /// Owner record is missing the key used to match pivot rows
    #[error("Missing owner key: {0}")]
    MissingOwnerKey(String),
}

impl From<RelationshipError> for ModelError {
    fn from(err: RelationshipError) -> Self {
        match err {
            RelationshipError::InvalidConfiguration(msg) => ModelError::Configuration(msg),
            RelationshipError::UnresolvableTable(msg) => ModelError::Resolution(msg),
            RelationshipError::MissingOwnerKey(msg) => ModelError::ColumnNotFound(msg),
        }
    }
}

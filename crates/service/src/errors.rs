use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Which kind of integrity constraint a write tripped over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Unique => f.write_str("unique"),
            ConstraintKind::ForeignKey => f.write_str("foreign key"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{kind} constraint violated: {message}")]
    ConstraintViolation { kind: ConstraintKind, message: String },
    #[error("connection error: {0}")]
    Connection(String),
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    pub fn foreign_key(message: impl Into<String>) -> Self {
        Self::ConstraintViolation { kind: ConstraintKind::ForeignKey, message: message.into() }
    }

    /// Stable numeric code for logs and callers that match on error classes.
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::Model(_) => 1000,
            ServiceError::NotFound(_) => 1001,
            ServiceError::ConstraintViolation { kind: ConstraintKind::Unique, .. } => 1002,
            ServiceError::ConstraintViolation { kind: ConstraintKind::ForeignKey, .. } => 1003,
            ServiceError::Connection(_) => 1100,
            ServiceError::TransactionAborted(_) => 1101,
            ServiceError::Db(_) => 1199,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, ServiceError::ConstraintViolation { kind: ConstraintKind::Unique, .. })
    }
}

// Driver messages `sql_err()` leaves unclassified: SQLite restrict triggers
// (extended code 1811), Postgres RESTRICT (23001) and CHECK failures.
const FOREIGN_KEY_MARKERS: &[&str] = &["FOREIGN KEY constraint failed", "violates RESTRICT setting", "violates foreign key constraint"];
const CHECK_MARKERS: &[&str] = &["CHECK constraint failed", "violates check constraint"];

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                return ServiceError::ConstraintViolation { kind: ConstraintKind::Unique, message };
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                return ServiceError::ConstraintViolation { kind: ConstraintKind::ForeignKey, message };
            }
            _ => {}
        }
        let text = err.to_string();
        if FOREIGN_KEY_MARKERS.iter().any(|m| text.contains(m)) {
            return ServiceError::foreign_key(text);
        }
        if CHECK_MARKERS.iter().any(|m| text.contains(m)) {
            return ServiceError::Validation(text);
        }
        match err {
            DbErr::Conn(e) => ServiceError::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => ServiceError::Connection(e.to_string()),
            DbErr::RecordNotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::Db(other.to_string()),
        }
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

//! # Service Error Types
//!
//! The error taxonomy callers see. Validation and database errors are
//! folded into four caller-facing categories.

use thiserror::Error;

use bodega_core::ValidationError;
use bodega_db::DbError;

/// Errors surfaced by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before any write.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced entity doesn't exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An exit or sale asked for more units than an area holds.
    /// Nothing was written.
    #[error("Insufficient stock of '{product}' in area {area_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product name when known, else the id.
        product: String,
        area_id: String,
        available: i64,
        requested: i64,
    },

    /// The underlying transaction failed for a non-domain reason.
    #[error("Transaction failed: {0}")]
    Transaction(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::InsufficientStock {
                product_id,
                area_id,
                available,
                requested,
            } => ServiceError::InsufficientStock {
                product: product_id,
                area_id,
                available,
                requested,
            },
            other => ServiceError::Transaction(other.to_string()),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

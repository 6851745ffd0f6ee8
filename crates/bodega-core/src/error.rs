//! # Error Types
//!
//! Input validation errors for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bodega-core (this file)                                               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bodega-db (separate crate)                                            │
//! │  └── DbError          - Database failures, incl. insufficient stock    │
//! │                         detected inside a transaction                  │
//! │                                                                         │
//! │  bodega-services (separate crate)                                      │
//! │  └── ServiceError     - What API handlers see                          │
//! │                                                                         │
//! │  Flow: ValidationError / DbError → ServiceError → Caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field names, ranges)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid movement type string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Collection must not be empty (e.g., sale with zero line items).
    #[error("{field} must not be empty")]
    Empty { field: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

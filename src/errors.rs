//! Unified error type for the catalog and review stores.
//!
//! Field-domain failures (length, range, charset, uniqueness) surface as
//! [`Error::Validation`]; dangling references and failed cascades surface as
//! [`Error::Integrity`]. Both are returned unchanged to the caller.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors produced by the store layer, configuration loading and startup.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value lies outside its allowed domain
    #[error("Validation error on `{field}`: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable description of the violated rule
        message: String,
    },

    /// A referenced record does not exist, or a cascade could not be applied
    #[error("Integrity error: {message}")]
    Integrity {
        /// Description of the broken reference
        message: String,
    },

    /// No category with the given id or slug
    #[error("Category not found: {key}")]
    CategoryNotFound {
        /// The id or slug that was looked up
        key: String,
    },

    /// No product with the given id
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The missing product id
        id: i64,
    },

    /// No review with the given id
    #[error("Review not found: {id}")]
    ReviewNotFound {
        /// The missing review id
        id: i64,
    },

    /// No user with the given id
    #[error("User not found: {id}")]
    UserNotFound {
        /// The missing user id
        id: i64,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// Error reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::Integrity`].
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Maps engine-level constraint failures onto the store taxonomy.
    ///
    /// A UNIQUE violation becomes a validation error on `field`, a foreign key
    /// violation becomes an integrity error. Anything else stays a database error.
    pub(crate) fn from_write(err: DbErr, field: &'static str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Validation {
                field,
                message: format!("value must be unique ({detail})"),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => Self::Integrity {
                message: format!("foreign key constraint failed ({detail})"),
            },
            _ => Self::Database(err),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

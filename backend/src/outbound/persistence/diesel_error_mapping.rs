//! Shared classification of Diesel failures for the repository adapters.
//!
//! Each adapter turns a [`DieselFailure`] into its own port error, so the
//! logging and the unique-constraint detection live in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Constraint names declared by the migrations.
pub(crate) mod constraints {
    pub const USERS_USERNAME: &str = "users_username_key";
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const ARTICLE_SLUG: &str = "article_slug_key";
}

/// Coarse outcome of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A UNIQUE or primary-key constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// The server closed the connection mid-operation.
    Connection { message: String },
    /// Any other query failure.
    Query { message: String },
}

impl DieselFailure {
    /// Whether this is a unique violation on `constraint`.
    pub(crate) fn violates(&self, constraint: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(name) } if name == constraint
        )
    }

    /// Message for the adapter's generic query or connection error.
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::UniqueViolation { constraint } => match constraint {
                Some(name) => format!("unique constraint violated: {name}"),
                None => "unique constraint violated".to_owned(),
            },
            Self::Connection { message } | Self::Query { message } => message,
        }
    }
}

/// Classify `error`, logging driver context at debug.
pub(crate) fn classify(error: DieselError, operation: &'static str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        other => debug!(error = %other, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection {
                message: "database connection error".to_owned(),
            }
        }
        DieselError::NotFound => DieselFailure::Query {
            message: "record not found".to_owned(),
        },
        DieselError::QueryBuilderError(_) => DieselFailure::Query {
            message: "database query error".to_owned(),
        },
        _ => DieselFailure::Query {
            message: "database error".to_owned(),
        },
    }
}

//! Error types for bloodbank.
//!
//! This module defines all error types used throughout the bloodbank crate,
//! providing detailed context for debugging and user-facing messages that can
//! be re-presented to whoever submitted the offending input.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The main error type for bloodbank operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A submitted form failed one or more field rules.
    #[error("validation failed: {}", describe_fields(.0))]
    ValidationFailed(ValidationErrors),

    /// A donor questionnaire failed one or more eligibility rules.
    #[error("donor is not eligible: {}", .0.join("; "))]
    Ineligible(Vec<String>),

    /// A blood-type token is not one of the eight ABO/Rh labels.
    #[error("invalid blood type: {0:?}")]
    InvalidBloodType(String),

    /// A token for some other enumerated field (urgency, theme) is not recognised.
    #[error("unknown {field}: {value:?}")]
    UnknownValue {
        /// The field being parsed.
        field: &'static str,
        /// The rejected token.
        value: String,
    },

    // === Persistence Errors ===
    /// The durable key-value surface rejected a write (absent, full, over quota).
    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// A collection's stored ids leave no larger id to assign.
    #[error("no ids left in '{key}': the largest stored id is at the integer limit")]
    IdSpaceExhausted {
        /// The collection's storage key.
        key: String,
    },

    /// A persisted value could not be parsed.
    #[error("malformed persisted data under key '{key}': {source}")]
    MalformedPersistedData {
        /// The storage key holding the bad value.
        key: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for bloodbank operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

fn describe_fields(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a new storage unavailable error.
    #[must_use]
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Create a new invalid blood type error.
    #[must_use]
    pub fn invalid_blood_type(token: impl Into<String>) -> Self {
        Self::InvalidBloodType(token.into())
    }

    /// Create a new unknown value error.
    #[must_use]
    pub fn unknown_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            field,
            value: value.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the durable surface refused a write.
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// Check if this error came from user input that can be corrected and resubmitted.
    #[must_use]
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_)
                | Self::Ineligible(_)
                | Self::InvalidBloodType(_)
                | Self::UnknownValue { .. }
        )
    }

    /// The field errors carried by a validation failure, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

//! Core error types for interval-timer-core.
//!
//! The session engine reports rejected operations through [`SessionError`];
//! storage and configuration failures have their own enums and everything
//! folds into [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::EngineState;

/// Core error type for interval-timer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session control errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A workout field is negative
    #[error("'{field}' must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    /// A workout field has a fractional part or is not a finite number
    #[error("'{field}' must be a whole number (got {value})")]
    NotIntegral { field: &'static str, value: f64 },

    /// A workout field does not fit the supported range
    #[error("'{field}' is too large (got {value}, max {max})")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: u32,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Engine operation a caller attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Pause,
    Resume,
    Skip,
    Advance,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Pause => "pause",
            Operation::Resume => "resume",
            Operation::Skip => "skip",
            Operation::Advance => "advance",
        };
        f.write_str(name)
    }
}

/// Rejected session control. None of these leave the engine partially mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Start was called with an unusable configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    /// Start was called while a session is live
    #[error("a session is already live")]
    DoubleStart,

    /// The operation is not valid in the engine's current state
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: Operation,
        state: EngineState,
    },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

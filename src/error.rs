//! Error types for pg-gateway.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQL the database refused to prepare (syntax errors, unknown objects, etc.)
    #[error("Invalid SQL: {0}")]
    Validation(String),

    /// Failures after a statement was accepted (constraint violations, decode errors, etc.)
    #[error("Execution error: {0}")]
    Execution(String),

    /// Catalog query errors.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (bind failures, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the error was caused by the caller's input.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Validation(_) => "Validation Error",
            Self::Execution(_) => "Execution Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using GatewayError.
pub type Result<T> = std::result::Result<T, GatewayError>;

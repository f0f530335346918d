//! Error types for the monitor.
//!
//! All fallible operations return [`Result`], whose error type is
//! [`MonitorError`]. Errors raised while verifying a single candidate query
//! are never propagated past the matching run; they are recorded as
//! [`MatchError`](crate::matcher::MatchError)s inside the
//! [`Matches`](crate::matcher::Matches) result instead. Only fatal errors
//! (see [`MonitorError::is_fatal`]) abort a whole run.
//!
//! # Examples
//!
//! ```
//! use sarissa_monitor::error::{MonitorError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MonitorError::invalid_config("threads must be greater than zero"))
//! }
//!
//! let err = example_operation().unwrap_err();
//! assert!(err.is_fatal());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for monitor operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (invalid patterns, unsupported constructs, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Errors raised while building presearcher terms or selection queries.
    #[error("Presearcher error: {0}")]
    Presearcher(String),

    /// Errors from the stored query index.
    #[error("Index error: {0}")]
    Index(String),

    /// Errors raised while verifying a candidate query.
    #[error("Match error: {0}")]
    Match(String),

    /// Construction-time misconfiguration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker or the coordinator was interrupted; the run cannot be resumed.
    #[error("Interrupted during match: {0}")]
    Interrupted(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with MonitorError.
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        MonitorError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        MonitorError::Query(msg.into())
    }

    /// Create a new presearcher error.
    pub fn presearcher<S: Into<String>>(msg: S) -> Self {
        MonitorError::Presearcher(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        MonitorError::Index(msg.into())
    }

    /// Create a new match error.
    pub fn matching<S: Into<String>>(msg: S) -> Self {
        MonitorError::Match(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        MonitorError::InvalidConfig(msg.into())
    }

    /// Create a new interrupted error.
    pub fn interrupted<S: Into<String>>(msg: S) -> Self {
        MonitorError::Interrupted(msg.into())
    }

    /// Whether this error aborts a whole matching run rather than a single query.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MonitorError::Interrupted(_) | MonitorError::InvalidConfig(_)
        )
    }
}

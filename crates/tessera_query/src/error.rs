//! # Query Error Types
//!
//! Matching never fails. These errors come from strict query construction and
//! from loading configuration.

use thiserror::Error;

use crate::key::ConstraintGroup;

/// Errors that can occur while building queries or loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Strict validation found an entry lenient parsing would have dropped.
    #[error("unrecognized entry in {group} constraints: {reason}")]
    UnrecognizedEntry {
        /// The list the entry was found in.
        group: ConstraintGroup,
        /// What was wrong with it.
        reason: String,
    },

    /// Configuration could not be parsed or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),
}

/// Result type for query construction.
pub type BuildResult<T> = Result<T, QueryError>;

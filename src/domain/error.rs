//! Error types for the Reelgrid plugin.
//!
//! This module defines the centralized error type [`ReelgridError`] and a type alias
//! [`Result`] used throughout the plugin. None of these errors are fatal: fetch and
//! validation failures stall pagination, storage failures roll back optimistic
//! favorite toggles, and everything else is logged and swallowed at the plugin shim.

use thiserror::Error;

/// The main error type for Reelgrid plugin operations.
///
/// # Examples
///
/// ```
/// use reelgrid::domain::ReelgridError;
///
/// let err = ReelgridError::Fetch("HTTP 503".to_string());
/// assert_eq!(err.to_string(), "Fetch error: HTTP 503");
/// ```
#[derive(Debug, Error)]
pub enum ReelgridError {
    /// A page or detail request failed at the transport level or returned a
    /// non-success status code.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The remote response body did not match the expected shape.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reading from or writing to the favorites store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The movie is already in the favorites list.
    #[error("Movie {0} is already a favorite")]
    DuplicateFavorite(u64),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed outside of response validation.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Theme parsing or application failed.
    #[error("Theme error: {0}")]
    Theme(String),

    /// Communication with the background worker failed.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for Reelgrid operations.
pub type Result<T> = std::result::Result<T, ReelgridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_the_movie() {
        assert_eq!(
            ReelgridError::DuplicateFavorite(603).to_string(),
            "Movie 603 is already a favorite"
        );
    }
}

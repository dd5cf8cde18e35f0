//! Error types for the harness.

use thiserror::Error;

/// Main error type for the harness.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),
}

/// Result type alias using the harness error type.
pub type Result<T> = std::result::Result<T, Error>;

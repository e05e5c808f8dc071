//! Error types for the parley-tui crate

use std::io;
use thiserror::Error;

/// Result type alias for parley-tui operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for parley-tui
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal I/O errors
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors from the session client
    #[error("Client error: {0}")]
    Client(#[from] parley_client::Error),
}

//! Error types for the parley-client crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failures talking to the session service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx replies from the session service, with the body text the
    /// service uses for its error detail.
    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// Payloads that did not decode to the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Failures on the server-push event channel.
    #[error("Event stream error: {0}")]
    Stream(String),

    /// A lifecycle command issued while its gate is closed.
    #[error("Command '{command}' is not allowed while session is {status}")]
    CommandNotAllowed { command: String, status: String },

    /// Malformed base URL or endpoint construction.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

//! Typed client for the debate session service.
//!
//! Keeps an ordered, deduplicated transcript in sync with the server's push
//! channel plus a polling fallback, and drives session lifecycle commands.

pub mod api;
pub mod controller;
pub mod error;
pub mod sse;
pub mod stream;
pub mod transcript;
pub mod types;

pub use api::{ApiClient, DEFAULT_SERVER_URL};
pub use controller::{POLL_INTERVAL, SessionController};
pub use error::{Error, Result};
pub use stream::{ConnectionState, StreamEvent, TurnStream};
pub use transcript::Transcript;
pub use types::{
    Actor, Session, SessionCommand, SessionSnapshot, SessionStatus, SessionSummary, Turn, Verdict,
    Winner,
};

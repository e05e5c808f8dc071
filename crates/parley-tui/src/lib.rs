//! Terminal UI for watching and controlling debate sessions.

pub mod error;
pub mod tui;

pub use error::{Error, Result};
pub use tui::{Tui, cleanup_terminal, run_tui, setup_panic_hook};

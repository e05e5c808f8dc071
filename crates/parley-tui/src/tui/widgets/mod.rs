pub mod command_hints;
pub mod sidebar;
pub mod status_bar;
pub mod transcript;

pub use command_hints::{CommandHints, command_for_key};
pub use sidebar::{SessionPicker, SessionPickerState};
pub use status_bar::StatusBar;
pub use transcript::TranscriptView;

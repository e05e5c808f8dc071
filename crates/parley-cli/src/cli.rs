use clap::{Parser, Subcommand};
use uuid::Uuid;

use parley_client::DEFAULT_SERVER_URL;

/// Watch and control live debate sessions from the terminal.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Session to open (defaults to the most recently updated one)
    pub session: Option<Uuid>,

    /// Base URL of the debate session service
    #[arg(long, env = "PARLEY_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Create a new session and open it
    New {
        /// Debate topic
        topic: String,

        /// Session settings as a JSON object (e.g. '{"max_rounds": 3}')
        #[arg(long)]
        settings: Option<String>,

        /// Start the debate immediately after creating it
        #[arg(long)]
        start: bool,
    },
    /// List recent sessions, most recently updated first
    List {
        /// Maximum number of sessions to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

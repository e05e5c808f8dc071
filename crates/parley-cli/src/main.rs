use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use serde_json::{Map, Value};
use uuid::Uuid;

use parley_client::{ApiClient, SessionCommand};
use parley_tui::run_tui;

mod cli;
mod logging;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre for better error reports
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize tracing (level configured via RUST_LOG env var)
    logging::init_tracing()?;

    let api = ApiClient::new(&cli.server)
        .wrap_err_with(|| format!("invalid server URL: {}", cli.server))?;

    match cli.command {
        Some(Commands::New {
            topic,
            settings,
            start,
        }) => {
            let settings = parse_settings(settings.as_deref())?;
            let session = api.create_session(&topic, settings).await?;
            if start {
                api.dispatch(session.id, SessionCommand::Start).await?;
            }
            println!("Session ID: {}", session.id);
            run_tui(api, session.id).await?;
        }
        Some(Commands::List { limit }) => {
            let sessions = api.list_sessions(limit).await?;
            if sessions.is_empty() {
                println!("No sessions on the server.");
                return Ok(());
            }
            for session in sessions {
                println!(
                    "{}  {:<9}  r{}  {}",
                    session.id, session.status, session.completed_rounds, session.topic
                );
            }
        }
        None => {
            let session_id = match cli.session {
                Some(id) => id,
                None => latest_session(&api).await?,
            };
            run_tui(api, session_id).await?;
        }
    }

    Ok(())
}

fn parse_settings(raw: Option<&str>) -> Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str::<Value>(raw)
            .wrap_err("--settings is not valid JSON")?
        {
            Value::Object(map) => Ok(map),
            _ => Err(eyre!("--settings must be a JSON object")),
        },
    }
}

/// Resolve the most recently updated session when none was named.
async fn latest_session(api: &ApiClient) -> Result<Uuid> {
    let sessions = api.list_sessions(1).await?;
    sessions.first().map(|s| s.id).ok_or_else(|| {
        eyre!("no sessions on the server; create one with `parley new <topic>`")
    })
}

use chrono::Local;
use std::io;
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Initialize the tracing system with a file logger that appends to a timestamp-named file.
/// Configuration is loaded from the RUST_LOG environment variable.
///
/// The TUI owns the terminal, so logs never go to stdout while a home
/// directory is available to write files under.
pub fn init_tracing() -> io::Result<()> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(home_dir) = dirs::home_dir() {
        let log_dir = home_dir.join(".parley");
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = rolling::never(log_dir.clone(), format!("{timestamp}.log"));
        let filter = EnvFilter::from_default_env();

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::Layer::new()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter);

        tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)?;

        tracing::debug!(
            target: "parley::logging",
            path = %log_dir.join(format!("{timestamp}.log")).display(),
            "Tracing initialized with file output. Filter configured via RUST_LOG env var."
        );
    } else {
        // Fallback to stdout
        let filter = EnvFilter::from_default_env();

        let subscriber = tracing_subscriber::registry()
            .with(fmt::Layer::default().with_ansi(true).with_target(true))
            .with(filter);

        tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)?;

        tracing::debug!(
            target: "parley::logging",
            "Tracing initialized with stdout output. Filter configured via RUST_LOG env var."
        );
    }

    Ok(())
}

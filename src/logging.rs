//! Tracing subscriber setup for the two binaries.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Relay: human-readable log on stderr, `RUST_LOG`-filterable.
pub fn init_relay() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Client: the terminal belongs to the TUI, so events are only recorded when
/// `CAUSERIE_LOG` names a file; otherwise nothing is subscribed.
pub fn init_client() -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = std::env::var_os("CAUSERIE_LOG") else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

use crate::error::{Error, Result};
use std::{fs::OpenOptions, path::Path, sync::Mutex};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter, e.g. `RLQUIZ_LOG=rlquiz=debug`.
pub const LOG_ENV: &str = "RLQUIZ_LOG";

/// Installs the global subscriber.
///
/// Events go to stdout and, when `transcript` is set, are also appended to
/// that file without ANSI colors. Calling this again once a subscriber is
/// installed does nothing.
pub fn init(transcript: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_target(false)
        .with_level(false)
        .without_time();

    let file = match transcript {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| Error::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .is_err()
    {
        tracing::debug!("a global subscriber is already installed");
    }

    Ok(())
}

//! Activity log setup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogTarget;

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
///
/// The log file is opened in append mode and created if missing; failing to
/// open it is fatal for the caller.
pub fn setup_logger(target: &LogTarget, default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            default_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stdout => registry.with(fmt::layer()).try_init()?,
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?
        }
    }

    Ok(())
}

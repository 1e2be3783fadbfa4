//! Tracing setup. The terminal belongs to the UI, so logs go to a daily
//! rolling file instead of stderr.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub const LOG_FILE_PREFIX: &str = "taskboard.log";

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// filter. Keep the returned guard alive until exit or buffered lines are
/// lost.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = config.log_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}

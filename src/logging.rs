//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence. Otherwise a Debug build logs at `debug` and
//! a Release build uses the configured default level. Output goes to the
//! configured log file, or stderr when none is set.

use crate::config::DbConfig;
use crate::error::{DbError, Result};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub fn filter_for(config: &DbConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if config.is_debug() {
        "debug"
    } else {
        config.logging.log_level.default.as_str()
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &DbConfig) -> Result<()> {
    let filter = filter_for(config);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match config.logging.log_file() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| DbError::Config(e.to_string()))
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| DbError::Config(e.to_string())),
    }
}

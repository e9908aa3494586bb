//! Tracing subscriber setup for the command line.

use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error>;

const DEFAULT_LEVEL: &str = "warn";

fn open_log_file(path: &str) -> Result<File, BoxError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| format!("Failed to open log file {path}: {err}").into())
}

fn map_init_err<E: std::fmt::Display>(err: E) -> BoxError {
    format!("Failed to initialize logging: {err}").into()
}

/// Resolve the filter directive: explicit level, then `CHROMILP_TRACE`,
/// then `warn`.
fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| env::var("CHROMILP_TRACE").ok())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

fn build_filter(level: &str) -> Result<EnvFilter, BoxError> {
    if level.eq_ignore_ascii_case("off") {
        return Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()));
    }
    EnvFilter::try_new(level).map_err(|err| format!("Invalid log filter {level:?}: {err}").into())
}

/// Install the global subscriber.
///
/// Output goes to stderr, pretty or JSON per `CHROMILP_LOG_FORMAT`, and is
/// mirrored into `CHROMILP_LOG_FILE` when set. Returns `false` if a
/// subscriber was already installed.
pub fn init_logging(level: Option<&str>) -> Result<bool, BoxError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let filter = build_filter(&resolve_level(level))?;

    let format = env::var("CHROMILP_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let log_file = env::var("CHROMILP_LOG_FILE").ok();
    let use_json = format.eq_ignore_ascii_case("json");

    if !use_json && !format.eq_ignore_ascii_case("pretty") {
        return Err("Invalid CHROMILP_LOG_FORMAT (expected 'json' or 'pretty')".into());
    }

    if use_json {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .json();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .pretty();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    }

    Ok(true)
}

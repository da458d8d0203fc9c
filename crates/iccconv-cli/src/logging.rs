//! Tracing subscriber setup.
//!
//! Libraries only emit events; the binary decides where they go. Verbosity
//! maps to a level filter unless `RUST_LOG` is set and no `-v` was given.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

fn verbosity_to_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,iccconv=info",
        1 => "debug",
        _ => "trace",
    }
}

fn filter(verbosity: u8) -> Result<EnvFilter> {
    if verbosity == 0 {
        if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
            if !env.is_empty() {
                return EnvFilter::try_new(&env).with_context(|| format!("Invalid RUST_LOG: {env}"));
            }
        }
    }
    Ok(EnvFilter::try_new(verbosity_to_filter(verbosity))?)
}

/// Installs the global subscriber: compact stderr output, plus a plain-text
/// file when `log_file` is given. Keep the returned guard alive until exit so
/// buffered file records are flushed.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let registry = Registry::default().with(filter(verbosity)?).with(console);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file has no file name: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init().context("Failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}

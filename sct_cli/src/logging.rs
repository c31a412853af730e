//! Console and file log setup.

use std::path::Path;

use eyre::WrapErr;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::FILE_GUARD;

fn rotation_from(s: Option<&str>) -> Rotation {
    match s {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    }
}

/// Install the global subscriber.
///
/// Console logs go to stderr so stdout carries only results. `RUST_LOG`
/// overrides `level`. When `[logging].file` is set, JSON lines are written
/// there through a non-blocking appender whose guard lives in `FILE_GUARD`.
pub fn init(level: &str, json: bool, logging: &sct_config::Logging) -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let appender =
                RollingFileAppender::new(rotation_from(logging.rotation.as_deref()), dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if let Ok(mut slot) = FILE_GUARD.lock() {
                *slot = Some(guard);
            }
            let file_filter = logging
                .level
                .as_deref()
                .map_or_else(|| EnvFilter::new("info"), EnvFilter::new);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(filter))
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")
}

/// Flush and close the file sink. Call before exiting.
pub fn shutdown() {
    if let Ok(mut slot) = FILE_GUARD.lock() {
        slot.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rotation_never_rotates() {
        assert_eq!(rotation_from(Some("daily")), Rotation::DAILY);
        assert_eq!(rotation_from(Some("hourly")), Rotation::HOURLY);
        assert_eq!(rotation_from(Some("weekly")), Rotation::NEVER);
        assert_eq!(rotation_from(None), Rotation::NEVER);
    }
}

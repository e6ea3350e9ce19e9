use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::ValueEnum;
use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Log levels accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Where the log file goes: the given path, or `optix.log` in the working
/// directory.
pub fn log_path(custom: Option<&Path>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Ok(path.to_path_buf())
        }
        None => Ok(std::env::current_dir()?.join(LOG_FILE.as_str())),
    }
}

/// Initialize file logging. The CLI level wins over `RUST_LOG`; without either
/// the level is WARN.
pub fn init_with(custom_log_path: Option<&Path>, level: Option<LogLevel>) -> Result<PathBuf> {
    let path = log_path(custom_log_path)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let default_level: tracing::Level = level.map(Into::into).unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_file_name() {
        assert_eq!(LOG_FILE.as_str(), "optix.log");
        let path = log_path(None).unwrap();
        assert!(path.ends_with("optix.log"));
    }

    #[test]
    fn test_custom_path_creates_parent() {
        let dir = tempfile::TempDir::new().unwrap();
        let wanted = dir.path().join("logs").join("run.log");
        let path = log_path(Some(&wanted)).unwrap();
        assert_eq!(path, wanted);
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
    }
}

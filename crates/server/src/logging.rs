use anyhow::{Context, Result};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Stdout in the configured format plus a daily-rotated file under `logging.dir`.
pub fn init_logger(cfg: &LoggingConfig) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directive) => EnvFilter::try_new(directive),
        Err(_) => EnvFilter::try_new(&cfg.level),
    }
    .context("Invalid log filter")?;

    let file_appender = file_appender(cfg)?;

    match cfg.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stdout).with_target(true))
                .with(fmt::layer().json().with_writer(file_appender).with_target(true))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty().with_writer(std::io::stdout))
                .with(fmt::layer().with_writer(file_appender).with_ansi(false))
                .init();
        }
    }

    Ok(())
}

fn file_appender(cfg: &LoggingConfig) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&cfg.file_prefix)
        .filename_suffix("log")
        .build(&cfg.dir)
        .with_context(|| format!("Cannot open log directory {}", cfg.dir))
}

// 📝 Logging - tracing subscriber setup shared by the CLI and the server

use anyhow::Result;
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".into(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    /// RUST_LOG for the level, LOG_FORMAT (json|pretty|compact) for the format
    pub fn from_env() -> Self {
        LoggingConfig {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: parse_format(env::var("LOG_FORMAT").ok().as_deref()),
        }
    }

    /// Quieter preset for the terminal UI, where log lines would tear the screen
    pub fn quiet() -> Self {
        LoggingConfig {
            level: "warn".into(),
            ..Self::default()
        }
    }

    /// Install the global subscriber. Logs go to stderr so stdout stays clean
    /// for `html`/`json` output.
    pub fn init(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(&self.level)
            .unwrap_or_else(|_| EnvFilter::new("info"))
            .add_directive(
                "hyper=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                "reqwest=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            );

        let registry = tracing_subscriber::registry().with(env_filter);

        match self.format {
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?,
            LogFormat::Pretty => registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?,
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()?,
        }

        Ok(())
    }
}

fn parse_format(raw: Option<&str>) -> LogFormat {
    match raw {
        Some("json") => LogFormat::Json,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::Compact,
    }
}

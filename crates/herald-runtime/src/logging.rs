//! Global `tracing` subscriber setup.
//!
//! [`init_from_config`] installs a subscriber described by [`LoggingConfig`].
//! [`LoggingBuilder`] does the same with extra filter directives layered on:
//!
//! ```rust,ignore
//! LoggingBuilder::new().directive("herald_gateway=trace").init();
//! ```
//!
//! Every payload is handled inside a `dispatch` span carrying the event tag,
//! so enabling `span_events.new`/`close` brackets each dispatch in the log.
//! `RUST_LOG`, when set, replaces the configured base level.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

/// Installs a subscriber built from `config`. Does nothing if one is
/// already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// A [`LoggingConfig`] plus extra filter directives.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
}

impl LoggingBuilder {
    /// Compact output to stdout at `info`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            config: config.clone(),
            directives: Vec::new(),
        }
    }

    /// Adds a filter directive such as `herald_gateway=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the global subscriber, failing if one is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.filter();
        tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(filter)
            .try_init()
    }

    /// Per-target levels from the config first, then explicit directives.
    fn directives(&self) -> Vec<String> {
        let mut directives: Vec<String> = self
            .config
            .filters
            .iter()
            .map(|(target, level)| format!("{target}={level}"))
            .collect();
        directives.sort();
        directives.extend(self.directives.iter().cloned());
        directives
    }

    fn filter(&self) -> EnvFilter {
        let base = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));

        self.directives()
            .iter()
            .fold(base, |filter, directive| match directive.parse() {
                Ok(d) => filter.add_directive(d),
                Err(e) => {
                    eprintln!("Ignoring invalid log directive {directive:?}: {e}");
                    filter
                }
            })
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let config = &self.config;
        let layer = fmt::layer()
            .with_writer(self.writer())
            .with_span_events(span_events(&config.span_events))
            .with_thread_ids(config.thread_ids)
            .with_file(config.file_location)
            .with_line_number(config.file_location);

        match config.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
        }
    }

    fn writer(&self) -> BoxMakeWriter {
        match self.config.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => {
                let path = self
                    .config
                    .file_path
                    .as_deref()
                    .unwrap_or_else(|| Path::new("herald.log"));
                BoxMakeWriter::new(file_appender(path, self.config.rotation))
            }
        }
    }
}

fn file_appender(path: &Path, rotation: LogRotation) -> rolling::RollingFileAppender {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "herald.log".into(), |n| n.to_os_string());
    match rotation {
        LogRotation::Never => rolling::never(dir, name),
        LogRotation::Hourly => rolling::hourly(dir, name),
        LogRotation::Daily => rolling::daily(dir, name),
    }
}

fn span_events(config: &SpanEventConfig) -> FmtSpan {
    [
        (config.new, FmtSpan::NEW),
        (config.enter, FmtSpan::ENTER),
        (config.exit, FmtSpan::EXIT),
        (config.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_directives_from_filters_then_explicit() {
        let mut config = LoggingConfig::default();
        config.filters.insert("herald_gateway".into(), LogLevel::Trace);
        config.filters.insert("herald_core".into(), LogLevel::Warn);

        let builder = LoggingBuilder::from_config(&config).directive("replay_bot=debug");
        assert_eq!(
            builder.directives(),
            ["herald_core=warn", "herald_gateway=trace", "replay_bot=debug"]
        );
    }

    #[test]
    fn test_span_events() {
        let mut config = SpanEventConfig::default();
        assert_eq!(span_events(&config), FmtSpan::NONE);

        config.new = true;
        config.close = true;
        assert_eq!(span_events(&config), FmtSpan::NEW | FmtSpan::CLOSE);
    }
}

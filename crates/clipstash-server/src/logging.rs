//! Logging configuration and initialization.
//!
//! Presets pick a level per `clipstash::*` target; `--log target=level`
//! overrides individual targets, and `RUST_LOG` replaces everything.

use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const TARGET_PREFIX: &str = "clipstash::";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, mutations and failures
    #[default]
    Production,
    /// Adds per-request and watcher detail
    Verbose,
    Debug,
    /// Includes every change notification
    Trace,
    /// Warnings and errors only
    Quiet,
}

impl LogPreset {
    fn directives(self) -> &'static [&'static str] {
        match self {
            LogPreset::Production => &[
                "clipstash::startup=info",
                "clipstash::api=info",
                "clipstash::ws=info",
                "clipstash::store=info",
                "clipstash::gateway=info",
                "clipstash::watcher=warn",
                "clipstash::retention=info",
                "clipstash::events=off",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &[
                "clipstash=info",
                "clipstash::watcher=info",
                "clipstash::events=off",
                "tower_http=info",
            ],
            LogPreset::Debug => &["clipstash=debug", "clipstash::events=off", "tower_http=debug"],
            LogPreset::Trace => &["clipstash=trace", "tower_http=trace"],
            LogPreset::Quiet => &["clipstash=warn", "tower_http=error"],
        }
    }
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Full target name -> level
    pub overrides: BTreeMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let preset = if quiet {
            LogPreset::Quiet
        } else if trace {
            LogPreset::Trace
        } else if debug {
            LogPreset::Debug
        } else if verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        };

        // "gateway=debug,store=trace" or repeated flags
        let overrides = log_overrides
            .iter()
            .flat_map(|arg| arg.split(','))
            .filter_map(|part| {
                let (target, level) = part.split_once('=')?;
                let level = Level::from_str(level.trim()).ok()?;
                Some((qualify_target(target.trim()), level))
            })
            .collect();

        Self {
            preset,
            overrides,
            format,
        }
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let mut directives: Vec<String> =
            self.preset.directives().iter().map(|d| d.to_string()).collect();
        directives.extend(
            self.overrides
                .iter()
                .map(|(target, level)| format!("{}={}", target, level.to_string().to_lowercase())),
        );

        EnvFilter::try_new(directives.join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// "gateway" -> "clipstash::gateway"; foreign crates pass through.
fn qualify_target(target: &str) -> String {
    if target == "clipstash" || target.starts_with(TARGET_PREFIX) || target == "tower_http" {
        target.to_string()
    } else {
        format!("{TARGET_PREFIX}{target}")
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_quiet_wins_over_other_presets() {
        let config = LogConfig::from_cli(true, true, true, true, vec![], LogFormat::Text);
        assert_eq!(config.preset, LogPreset::Quiet);

        let config = LogConfig::from_cli(true, true, false, false, vec![], LogFormat::Text);
        assert_eq!(config.preset, LogPreset::Debug);

        let config = LogConfig::from_cli(false, false, false, false, vec![], LogFormat::Text);
        assert_eq!(config.preset, LogPreset::Production);
    }

    #[test]
    fn test_overrides_are_qualified() {
        let config = LogConfig::from_cli(
            false,
            false,
            false,
            false,
            vec![
                "gateway=debug".into(),
                "clipstash::store=trace,tower_http=info".into(),
                "watcher=loud".into(),
            ],
            LogFormat::Text,
        );

        assert_eq!(config.overrides.get("clipstash::gateway"), Some(&Level::DEBUG));
        assert_eq!(config.overrides.get("clipstash::store"), Some(&Level::TRACE));
        assert_eq!(config.overrides.get("tower_http"), Some(&Level::INFO));
        assert!(!config.overrides.contains_key("clipstash::watcher"));
    }
}

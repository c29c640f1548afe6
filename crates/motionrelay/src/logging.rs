use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events follow `--log-level`.
const RELAY_TARGETS: &[&str] = &[
    "motionrelay",
    "motionrelay_frame",
    "motionrelay_transport",
    "motionrelay_relay",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Relay crates log at `level`; anything else is capped at warnings.
///
/// `--log-level trace` then shows per-datagram events from the receive and
/// scheduler threads without dependency noise.
pub fn log_targets(level: LogLevel) -> Targets {
    let others = match level {
        LogLevel::Error => LevelFilter::ERROR,
        _ => LevelFilter::WARN,
    };
    RELAY_TARGETS
        .iter()
        .fold(Targets::new().with_default(others), |targets, target| {
            targets.with_target(*target, level.as_filter())
        })
}

/// Install the stderr subscriber. Thread names are kept because the relay
/// logs from its receive and scheduler threads.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true);
    let registry = tracing_subscriber::registry().with(log_targets(level));

    match format {
        LogFormat::Text => {
            let _ = registry.with(layer).try_init();
        }
        LogFormat::Json => {
            let _ = registry.with(layer.json()).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn relay_crates_follow_requested_level() {
        let targets = log_targets(LogLevel::Trace);
        assert!(targets.would_enable("motionrelay_transport::udp", &Level::TRACE));
        assert!(targets.would_enable("motionrelay_relay::scheduler", &Level::DEBUG));
        assert!(targets.would_enable("motionrelay::cmd::serve", &Level::TRACE));
    }

    #[test]
    fn other_crates_capped_at_warn() {
        let targets = log_targets(LogLevel::Trace);
        assert!(!targets.would_enable("crossbeam_channel", &Level::DEBUG));
        assert!(targets.would_enable("crossbeam_channel", &Level::WARN));
    }

    #[test]
    fn error_level_quiets_everything_below_error() {
        let targets = log_targets(LogLevel::Error);
        assert!(!targets.would_enable("motionrelay_transport::udp", &Level::WARN));
        assert!(!targets.would_enable("some_dependency", &Level::WARN));
        assert!(targets.would_enable("motionrelay_relay", &Level::ERROR));
    }
}

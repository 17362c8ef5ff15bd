use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Setup logging for the library
///
/// Installs a global `tracing` subscriber that writes to stdout with a compact
/// `HH:MM:SS` timestamp. `level` is an `EnvFilter` directive such as `"info"` or
/// `"sceua=debug"`; an empty or unparsable directive falls back to `info`.
///
/// The library itself only emits events, so calling this is optional. Fails if
/// a global subscriber is already installed.
pub fn setup_log(level: &str) -> Result<(), TryInitError> {
    let log_level = level.trim().to_lowercase();
    let env_filter = env_filter(&log_level);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_timer(CompactTimestamp);

    Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()?;
    tracing::debug!("Logging is configured with level: {}", log_level);
    Ok(())
}

// An empty directive would parse as "off"
fn env_filter(log_level: &str) -> EnvFilter {
    if log_level.is_empty() {
        return EnvFilter::new("info");
    }
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[derive(Clone)]
struct CompactTimestamp;

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn blank_or_invalid_level_falls_back_to_info() {
        assert_eq!(env_filter("").max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            env_filter("sceua=notalevel").max_level_hint(),
            Some(LevelFilter::INFO)
        );
        assert_eq!(env_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn second_install_fails_without_panicking() {
        // Another test binary thread may have installed one already; either
        // way the second call must report an error.
        let _ = setup_log("not a [valid directive");
        assert!(setup_log("debug").is_err());
    }
}

//! Thin wrapper over `tracing` (spec §6's OFF/Error/Warn/Info/Debug model).
//!
//! Grounded on `radiate-engines`'s `init_logging` (`crates/radiate-engines/src/lib.rs`):
//! a once-guarded `tracing_subscriber` registry plus a panic hook that logs
//! the panic before unwinding. `LogLevel` adds the mapping onto
//! `tracing::LevelFilter` spec.md asks for, so a caller can dial logging down
//! to `Off` without reaching for a custom sink abstraction.

use std::sync::Once;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// The logging verbosity spec.md §6 names. `Off` installs no subscriber at
/// all (and leaves any subscriber the caller already set up untouched);
/// every other variant maps onto the matching [`tracing::Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    fn to_filter(self) -> Option<tracing::level_filters::LevelFilter> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(tracing::level_filters::LevelFilter::ERROR),
            LogLevel::Warn => Some(tracing::level_filters::LevelFilter::WARN),
            LogLevel::Info => Some(tracing::level_filters::LevelFilter::INFO),
            LogLevel::Debug => Some(tracing::level_filters::LevelFilter::DEBUG),
        }
    }
}

static INIT_LOGGING: Once = Once::new();

/// Installs a compact `tracing_subscriber` formatter at `level`, once per
/// process. A no-op under [`LogLevel::Off`] or after the first call that
/// didn't request `Off` -- `radiate-engines`'s own `init_logging` is similarly
/// idempotent so a caller's `Search`/`Evolution` can call it unconditionally
/// without double-installing a global subscriber.
pub fn init_logging(level: LogLevel) {
    let Some(filter) = level.to_filter() else {
        return;
    };
    INIT_LOGGING.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            tracing::error!("panic: {}", info);
        }));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                    .with_target(false)
                    .with_level(true)
                    .compact(),
            )
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_maps_to_no_filter() {
        assert!(LogLevel::Off.to_filter().is_none());
    }

    #[test]
    fn every_other_level_maps_to_a_filter() {
        for level in [LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug] {
            assert!(level.to_filter().is_some());
        }
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogLevel::Info);
        init_logging(LogLevel::Debug);
    }
}

use once_cell::sync::OnceCell;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

static EXPORT_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Install the global subscriber. `RUST_LOG` selects the filter, `info` when
/// unset. Calling it again is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Like [`init`] with an explicit filter directive such as `otk_spi=debug`.
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    Minutely,
    Hourly,
    Daily,
}

impl Rotation {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "hourly" => Rotation::Hourly,
            "minutely" => Rotation::Minutely,
            _ => Rotation::Daily,
        }
    }
}

/// Rolling export log settings, read from `OTK_LOG_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RollingLog {
    dir: String,
    prefix: String,
    rotation: Rotation,
}

impl RollingLog {
    fn from_env() -> Option<Self> {
        if std::env::var("OTK_LOG_ROLL").ok().as_deref() != Some("1") {
            return None;
        }
        Some(Self {
            dir: std::env::var("OTK_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            prefix: std::env::var("OTK_LOG_PREFIX").unwrap_or_else(|_| "otk-export".into()),
            rotation: Rotation::parse(
                &std::env::var("OTK_LOG_ROTATION").unwrap_or_else(|_| "daily".into()),
            ),
        })
    }

    fn appender(&self) -> RollingFileAppender {
        if std::fs::create_dir_all(&self.dir).is_err() {
            tracing::warn!(directory = %self.dir, "failed to create export log directory");
        }
        match self.rotation {
            Rotation::Hourly => tracing_appender::rolling::hourly(&self.dir, &self.prefix),
            Rotation::Minutely => tracing_appender::rolling::minutely(&self.dir, &self.prefix),
            Rotation::Daily => tracing_appender::rolling::daily(&self.dir, &self.prefix),
        }
    }
}

fn install(filter: EnvFilter) {
    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    let Some(rolling) = RollingLog::from_env() else {
        let _ = registry.try_init();
        return;
    };
    let (nb, guard) = tracing_appender::non_blocking(rolling.appender());
    let _ = EXPORT_GUARD.set(guard);
    let targets = Targets::new().with_target(otk_exporter::EXPORT_TARGET, tracing::Level::INFO);
    let export_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(nb)
        .with_filter(targets);
    let _ = registry.with(export_layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_defaults_to_daily() {
        assert_eq!(Rotation::parse("HOURLY"), Rotation::Hourly);
        assert_eq!(Rotation::parse("minutely"), Rotation::Minutely);
        assert_eq!(Rotation::parse("weekly"), Rotation::Daily);
    }

    #[test]
    #[serial_test::serial]
    fn rolling_log_is_opt_in() {
        std::env::remove_var("OTK_LOG_ROLL");
        assert_eq!(RollingLog::from_env(), None);

        std::env::set_var("OTK_LOG_ROLL", "1");
        std::env::set_var("OTK_LOG_DIR", "/tmp/otk-logs");
        std::env::remove_var("OTK_LOG_ROTATION");
        let rolling = RollingLog::from_env().unwrap();
        std::env::remove_var("OTK_LOG_ROLL");
        std::env::remove_var("OTK_LOG_DIR");

        assert_eq!(rolling.dir, "/tmp/otk-logs");
        assert_eq!(rolling.prefix, "otk-export");
        assert_eq!(rolling.rotation, Rotation::Daily);
    }

    #[test]
    fn init_is_idempotent() {
        init_with_filter("warn");
        init();
        tracing::info!("still alive");
    }
}

//! Tracing subscriber setup: console on stderr, optional rolling JSON file.

use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::FILE_GUARD;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const DEFAULT_LEVEL: &str = "info";

/// Level directive from `--log-level`, else `logging.level`, else info.
pub fn resolve_level<'a>(flag: Option<&'a str>, logging: &'a sorter_config::Logging) -> &'a str {
    flag.or(logging.level.as_deref()).unwrap_or(DEFAULT_LEVEL)
}

/// Install the global subscriber. `RUST_LOG` wins over both `flag` and `logging.level`.
pub fn init_tracing(json: bool, flag: Option<&str>, logging: &sorter_config::Logging) {
    let level = resolve_level(flag, logging);
    let mut rejected = None;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|e| {
            rejected = Some(e.to_string());
            EnvFilter::new(DEFAULT_LEVEL)
        });

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    if let Some(path) = logging.file.as_deref() {
        let path = Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "sorter.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
    }

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
    if let Some(err) = rejected {
        tracing::warn!(level, error = %err, "invalid log level, using info");
    }
}

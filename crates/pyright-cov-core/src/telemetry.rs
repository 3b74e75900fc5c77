//! Tracing initialisation for the pyright-cov binary.
//!
//! Logs always go to stderr: stdout belongs to the checker and the coverage
//! message.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting JSON log lines when set to `json`.
pub const LOG_FORMAT_ENV: &str = "PYRIGHT_COV_LOG_FORMAT";

/// Whether `PYRIGHT_COV_LOG_FORMAT` asks for JSON output.
pub fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV)
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
///
/// `RUST_LOG` takes precedence over `level`, so `RUST_LOG=pyright_cov_core=debug`
/// shows checker launches and the captured report.
///
/// Only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(stderr_layer.json()).try_init().ok();
    } else {
        registry.with(stderr_layer).try_init().ok();
    }
}

//! Tracing setup for binaries built on the runtime.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Environment variable naming a log file. Unset means stderr.
pub const LOG_FILE_ENV: &str = "PORTAL_RUNTIME_LOG";

/// Installs a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, else [`Config::log_filter`], else
/// `info`; `debug = true` raises the fallback to `debug`. If
/// `PORTAL_RUNTIME_LOG` names a file, logs are written there so a terminal
/// renderer keeps the screen to itself.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing(config: &Config) {
    let fallback = config
        .log_filter
        .clone()
        .unwrap_or_else(|| if config.debug { "debug" } else { "info" }.to_owned());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let result = match std::env::var(LOG_FILE_ENV) {
        Ok(path) => match std::fs::File::create(&path) {
            Ok(file) => {
                let layer = fmt::layer().with_writer(file).with_ansi(false).with_target(true);
                tracing_subscriber::registry().with(filter).with(layer).try_init()
            }
            Err(err) => {
                eprintln!("warning: failed to create log file {path}: {err}");
                return;
            }
        },
        Err(_) => {
            let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };
    if result.is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::LOG_FILE_ENV;
use crate::error::{LedgerChatError, Result};

/// Install the global tracing subscriber.
///
/// Logs go to stderr filtered by `RUST_LOG` (default `info`). When
/// `LEDGERCHAT_LOG_FILE` is set, a second DEBUG-level layer appends to that
/// file. Calling this twice is harmless; the second call is ignored.
pub fn init_tracing() -> Result<()> {
    let file_logging = std::env::var(LOG_FILE_ENV).ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    if let Some(log_path) = file_logging {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|source| LedgerChatError::Io {
                path: log_path.clone().into(),
                source,
            })?;

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);

        let _ = registry.with(file_layer).try_init();
    } else {
        let _ = registry.try_init();
    }

    Ok(())
}

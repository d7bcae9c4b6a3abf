use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Installs the global subscriber: daily rolling file under the configured logs
/// directory, filtered by `RUST_LOG` or the configured filter.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init_logging(config: &AppConfig) -> Result<WorkerGuard, String> {
  let logs_dir = config.logs_path();
  fs::create_dir_all(&logs_dir).map_err(|e| format!("create logs dir {}: {e}", logs_dir.display()))?;
  let file_appender = tracing_appender::rolling::daily(&logs_dir, "bracket.log");
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter())),
    )
    .with_writer(non_blocking)
    .with_ansi(false)
    .try_init()
    .map_err(|e| format!("install log subscriber: {e}"))?;
  Ok(guard)
}

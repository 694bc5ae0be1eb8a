use crate::config::LoggingConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "unitrun.log";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Used by the `service` branch: the service manager attaches no console.
pub fn init_file_only(log_dir: &Path, cfg: &LoggingConfig) -> anyhow::Result<()> {
  init_impl(log_dir, cfg, false)
}

pub fn init_file_and_stderr(log_dir: &Path, cfg: &LoggingConfig) -> anyhow::Result<()> {
  init_impl(log_dir, cfg, true)
}

/// Fallback when the log directory is unusable.
pub fn init_stderr_only(cfg: &LoggingConfig) -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(env_filter(&cfg.level))
    .with(
      tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_target(true),
    )
    .try_init()?;
  Ok(())
}

fn init_impl(log_dir: &Path, cfg: &LoggingConfig, stderr: bool) -> anyhow::Result<()> {
  fs::create_dir_all(log_dir)?;
  prune_old_logs(log_dir, cfg.retention_days)?;

  let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
  let _ = FILE_GUARD.set(guard);

  let file_layer = tracing_subscriber::fmt::layer()
    .with_ansi(false)
    .with_writer(file_writer)
    .with_target(true);

  if stderr {
    let stderr_layer = tracing_subscriber::fmt::layer()
      .with_ansi(false)
      .with_writer(std::io::stderr)
      .with_target(true);

    tracing_subscriber::registry()
      .with(env_filter(&cfg.level))
      .with(file_layer)
      .with(stderr_layer)
      .try_init()?;
  } else {
    tracing_subscriber::registry()
      .with(env_filter(&cfg.level))
      .with(file_layer)
      .try_init()?;
  }

  Ok(())
}

fn env_filter(level: &str) -> tracing_subscriber::EnvFilter {
  tracing_subscriber::EnvFilter::try_new(level)
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Removes rotated log files older than `retention_days`. Zero keeps everything.
/// Returns how many files were removed.
pub fn prune_old_logs(log_dir: &Path, retention_days: u64) -> anyhow::Result<usize> {
  if retention_days == 0 {
    return Ok(0);
  }

  let cutoff = SystemTime::now()
    .checked_sub(Duration::from_secs(retention_days.saturating_mul(24 * 60 * 60)))
    .unwrap_or(SystemTime::UNIX_EPOCH);

  let entries = match fs::read_dir(log_dir) {
    Ok(e) => e,
    Err(_) => return Ok(0),
  };

  let mut removed = 0;
  for entry in entries.flatten() {
    let path: PathBuf = entry.path();
    if !is_log_file(&path) {
      continue;
    }

    let modified = match entry.metadata().and_then(|m| m.modified()) {
      Ok(t) => t,
      Err(_) => continue,
    };

    if modified < cutoff && fs::remove_file(&path).is_ok() {
      removed += 1;
    }
  }

  Ok(removed)
}

fn is_log_file(path: &Path) -> bool {
  let name = match path.file_name().and_then(|n| n.to_str()) {
    Some(n) => n,
    None => return false,
  };

  name == LOG_FILE_NAME || name.starts_with("unitrun.log.")
}

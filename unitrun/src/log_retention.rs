use std::path::PathBuf;
use unitrun_core::logging;
use unitrun_core::Unit;
use uuid::Uuid;

pub const LOG_RETENTION_ID: Uuid = Uuid::from_u128(0x0b7e_64f3_c2d1_4a95_8f30_6e1d_9a47_c2b6);

/// Prunes rotated log files older than the configured retention.
/// A numeric first argument overrides the retention in days.
pub struct LogRetention {
  dir: PathBuf,
  retention_days: u64,
}

impl LogRetention {
  pub fn new(dir: PathBuf, retention_days: u64) -> Self {
    Self {
      dir,
      retention_days,
    }
  }
}

impl Unit for LogRetention {
  fn id(&self) -> Uuid {
    LOG_RETENTION_ID
  }

  fn name(&self) -> &str {
    "Log Retention"
  }

  fn run(&self, args: &[String]) -> anyhow::Result<()> {
    let days = match args.first() {
      Some(v) => v
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("expected retention in days, got `{v}`"))?,
      None => self.retention_days,
    };

    let removed = logging::prune_old_logs(&self.dir, days)?;
    tracing::info!(dir = %self.dir.display(), retention_days = days, removed, "log retention applied");
    Ok(())
  }
}

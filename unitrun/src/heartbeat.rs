use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use unitrun_core::config::write_atomic;
use unitrun_core::Unit;
use uuid::Uuid;

pub const HEARTBEAT_ID: Uuid = Uuid::from_u128(0x3c9d_52e1_7a4f_4b08_9e6d_1f2a_b5c8_7d40);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
  pub last_run_unix_ms: u64,
  pub pid: u32,
  pub runs: u64,
  #[serde(default)]
  pub last_args: Vec<String>,
}

/// Records that the host is alive: last run time, pid and a cumulative run count.
pub struct Heartbeat {
  path: PathBuf,
}

impl Heartbeat {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  fn previous(&self) -> HeartbeatRecord {
    let raw = match fs::read_to_string(&self.path) {
      Ok(r) => r,
      Err(_) => return HeartbeatRecord::default(),
    };
    match toml::from_str(&raw) {
      Ok(rec) => rec,
      Err(e) => {
        tracing::warn!(path = %self.path.display(), error = %e, "heartbeat record unreadable; starting over");
        HeartbeatRecord::default()
      }
    }
  }
}

impl Unit for Heartbeat {
  fn id(&self) -> Uuid {
    HEARTBEAT_ID
  }

  fn name(&self) -> &str {
    "Heartbeat"
  }

  fn run(&self, args: &[String]) -> anyhow::Result<()> {
    let record = HeartbeatRecord {
      last_run_unix_ms: now_unix_ms(),
      pid: std::process::id(),
      runs: self.previous().runs.saturating_add(1),
      last_args: args.to_vec(),
    };
    write_atomic(&self.path, &toml::to_string_pretty(&record)?)?;
    tracing::info!(runs = record.runs, path = %self.path.display(), "heartbeat recorded");
    Ok(())
  }
}

fn now_unix_ms() -> u64 {
  use std::time::{SystemTime, UNIX_EPOCH};
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn run_count_accumulates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("heartbeat.toml");
    let unit = Heartbeat::new(path.clone());

    unit.run(&[]).unwrap();
    unit.run(&["--tag".to_string(), "nightly".to_string()]).unwrap();

    let rec: HeartbeatRecord = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rec.runs, 2);
    assert_eq!(rec.pid, std::process::id());
    assert_eq!(rec.last_args, vec!["--tag", "nightly"]);
    assert!(rec.last_run_unix_ms > 0);
  }

  #[test]
  fn corrupt_record_restarts_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heartbeat.toml");
    fs::write(&path, "runs = \"many\"").unwrap();

    Heartbeat::new(path.clone()).run(&[]).unwrap();
    let rec: HeartbeatRecord = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rec.runs, 1);
  }
}

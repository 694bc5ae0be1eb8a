mod digest;
mod heartbeat;
mod log_retention;
mod priority;

pub use digest::DirectoryDigest;
pub use heartbeat::Heartbeat;
pub use log_retention::LogRetention;

use std::path::Path;
use std::sync::Arc;
use unitrun_core::config::Config;
use unitrun_core::{paths, Catalog, UnitRef};

/// `--version` is only honoured as the selector token; later arguments belong to the branch.
pub fn wants_version(args: &[String]) -> bool {
  args.first().map(String::as_str) == Some("--version")
}

/// Built-in units, in the order they are listed and run.
pub fn catalog(cfg: &Config, base: &Path) -> Catalog {
  let units: Vec<UnitRef> = vec![
    Arc::new(Heartbeat::new(paths::heartbeat_path(base))),
    Arc::new(DirectoryDigest),
    Arc::new(LogRetention::new(
      paths::logs_dir(base),
      cfg.logging.retention_days,
    )),
  ];
  Catalog::new(units)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;
  use unitrun_core::{dispatch, Command, Discovery, ServiceHost, SystemServiceManager};

  fn args(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn catalog_ids_are_unique_and_non_nil() {
    let dir = tempfile::tempdir().unwrap();
    let units = catalog(&Config::default(), dir.path()).list_units().unwrap();
    assert_eq!(units.len(), 3);

    let ids: HashSet<_> = units.iter().map(|u| u.id()).collect();
    assert_eq!(ids.len(), units.len());
    assert!(ids.iter().all(|id| !id.is_nil()));
    assert_eq!(units[0].name(), "Heartbeat");
  }

  #[test]
  fn version_flag_only_counts_as_selector() {
    assert!(wants_version(&args(&["--version"])));
    assert!(wants_version(&args(&["--version", "extra"])));
    assert!(!wants_version(&args(&["install", "--version"])));
    assert!(!wants_version(&args(&[&heartbeat::HEARTBEAT_ID.to_string(), "--version"])));
    assert!(!wants_version(&[]));
  }

  #[test]
  fn version_flag_after_identifier_reaches_the_unit() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::default();
    let host = Arc::new(ServiceHost::new(
      Arc::new(catalog(&cfg, dir.path())),
      cfg.service.clone(),
    ));
    let lifecycle = SystemServiceManager::new(cfg.service.clone());
    let argv = args(&[&heartbeat::HEARTBEAT_ID.to_string(), "--version"]);
    assert!(!wants_version(&argv));

    let mut console = Vec::new();
    let cmd = dispatch::run(&argv, &host, &lifecycle, &mut console);
    assert_eq!(cmd, Some(Command::RunUnits));

    let raw = std::fs::read_to_string(paths::heartbeat_path(dir.path())).unwrap();
    let rec: heartbeat::HeartbeatRecord = toml::from_str(&raw).unwrap();
    assert_eq!(rec.runs, 1);
    assert_eq!(rec.last_args, vec!["--version"]);
  }
}

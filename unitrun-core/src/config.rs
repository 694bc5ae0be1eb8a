use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Config {
  pub logging: LoggingConfig,
  pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
  #[serde(default = "default_log_level")]
  pub level: String,

  #[serde(default = "default_retention_days")]
  pub retention_days: u64,
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_retention_days() -> u64 {
  14
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      retention_days: default_retention_days(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
  #[serde(default = "default_service_name")]
  pub name: String,

  #[serde(default = "default_display_name")]
  pub display_name: String,

  #[serde(default = "default_description")]
  pub description: String,

  /// Unit identifiers the service host runs every cycle.
  #[serde(default)]
  pub units: Vec<String>,

  #[serde(default = "default_interval_seconds")]
  pub interval_seconds: u64,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      name: default_service_name(),
      display_name: default_display_name(),
      description: default_description(),
      units: Vec::new(),
      interval_seconds: default_interval_seconds(),
    }
  }
}

fn default_service_name() -> String {
  "UNITRUN_HOST".to_string()
}

fn default_display_name() -> String {
  "UnitRun Host".to_string()
}

fn default_description() -> String {
  "Runs the configured UnitRun units on a fixed interval.".to_string()
}

fn default_interval_seconds() -> u64 {
  300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
  #[serde(default)]
  pub logging: Option<LoggingConfig>,

  #[serde(default)]
  pub service: Option<ServiceConfig>,
}

impl ConfigFile {
  fn normalize(self) -> Config {
    let mut cfg = Config::default();
    if let Some(l) = self.logging {
      cfg.logging = l;
    }
    if let Some(s) = self.service {
      cfg.service = s;
    }
    if cfg.service.interval_seconds == 0 {
      eprintln!("UnitRun: service.interval_seconds must be > 0; using 1");
      cfg.service.interval_seconds = 1;
    }
    cfg
  }

  fn needs_upgrade(&self) -> bool {
    self.logging.is_none() || self.service.is_none()
  }
}

pub fn load_or_create_default(path: &Path) -> anyhow::Result<Config> {
  let parent = path
    .parent()
    .ok_or_else(|| anyhow::anyhow!("config path has no parent: {}", path.display()))?;
  fs::create_dir_all(parent)?;

  if !path.exists() {
    let cfg = Config::default();
    write_atomic(path, &toml::to_string_pretty(&to_config_file(&cfg))?)?;
    return Ok(cfg);
  }

  let raw = fs::read_to_string(path)?;
  match toml::from_str::<ConfigFile>(&raw) {
    Ok(file) => {
      let upgrade = file.needs_upgrade();
      let cfg = file.normalize();
      if upgrade {
        let backup = parent.join(format!("config.toml.bak-{}", unix_secs()));
        let _ = fs::copy(path, &backup);
        let _ = write_atomic(path, &toml::to_string_pretty(&to_config_file(&cfg))?);
        eprintln!(
          "UnitRun: upgraded config defaults written to {} (backup: {})",
          path.display(),
          backup.display()
        );
      }
      Ok(cfg)
    }
    Err(e) => {
      let cfg = Config::default();
      let backup = parent.join(format!("config.toml.bad-{}", unix_secs()));
      let _ = fs::rename(path, &backup);
      write_atomic(path, &toml::to_string_pretty(&to_config_file(&cfg))?)?;
      eprintln!(
        "UnitRun: invalid config at {} (backed up to {}): {e}",
        path.display(),
        backup.display()
      );
      Ok(cfg)
    }
  }
}

fn to_config_file(cfg: &Config) -> ConfigFile {
  ConfigFile {
    logging: Some(cfg.logging.clone()),
    service: Some(cfg.service.clone()),
  }
}

fn unix_secs() -> u64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .unwrap_or_default()
    .as_secs()
}

pub fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
  let parent = path
    .parent()
    .ok_or_else(|| anyhow::anyhow!("file path has no parent: {}", path.display()))?;
  fs::create_dir_all(parent)?;

  let tmp = parent.join(format!(
    ".{}.tmp",
    path.file_name().unwrap_or_default().to_string_lossy()
  ));
  fs::write(&tmp, contents)?;
  fs::rename(&tmp, path)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let cfg = load_or_create_default(&path).unwrap();
    assert_eq!(cfg.logging.level, "info");
    assert_eq!(cfg.service.interval_seconds, 300);
    assert!(cfg.service.units.is_empty());

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("[logging]"));
    assert!(raw.contains("[service]"));
  }

  #[test]
  fn partial_file_is_upgraded_with_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
      &path,
      "[service]\nunits = [\"d436174b-60d5-46ab-85fb-66ca44d98159\"]\ninterval_seconds = 0\n",
    )
    .unwrap();

    let cfg = load_or_create_default(&path).unwrap();
    assert_eq!(cfg.service.units.len(), 1);
    assert_eq!(cfg.service.interval_seconds, 1);
    assert_eq!(cfg.service.name, "UNITRUN_HOST");
    assert_eq!(cfg.logging.retention_days, 14);

    let names: Vec<String> = fs::read_dir(dir.path())
      .unwrap()
      .flatten()
      .map(|e| e.file_name().to_string_lossy().into_owned())
      .collect();
    assert!(names.iter().any(|n| n.starts_with("config.toml.bak-")));
    assert!(fs::read_to_string(&path).unwrap().contains("[logging]"));
  }

  #[test]
  fn invalid_file_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "this is = = not toml").unwrap();

    let cfg = load_or_create_default(&path).unwrap();
    assert_eq!(cfg.service.interval_seconds, 300);

    let names: Vec<String> = fs::read_dir(dir.path())
      .unwrap()
      .flatten()
      .map(|e| e.file_name().to_string_lossy().into_owned())
      .collect();
    assert!(names.iter().any(|n| n.starts_with("config.toml.bad-")));
    assert!(toml::from_str::<ConfigFile>(&fs::read_to_string(&path).unwrap()).is_ok());
  }
}

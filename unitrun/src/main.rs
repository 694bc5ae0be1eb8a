use std::sync::Arc;
use unitrun_core::config::{self, Config};
use unitrun_core::{dispatch, logging, paths, Command, Invocation, ServiceHost, SystemServiceManager};

fn main() {
  let args: Vec<String> = std::env::args().skip(1).collect();

  if unitrun::wants_version(&args) {
    println!("{}", env!("CARGO_PKG_VERSION"));
    return;
  }

  let base = paths::base_dir();
  let cfg = config::load_or_create_default(&paths::config_path(&base)).unwrap_or_else(|e| {
    eprintln!("UnitRun: could not load config under {}: {e:?}", base.display());
    Config::default()
  });

  let log_dir = paths::logs_dir(&base);
  let logging_res = if Invocation::parse(&args).command == Command::RunAsService {
    logging::init_file_only(&log_dir, &cfg.logging)
  } else {
    logging::init_file_and_stderr(&log_dir, &cfg.logging)
  };
  if let Err(e) = logging_res {
    eprintln!("UnitRun: file logging unavailable at {}: {e:?}", log_dir.display());
    let _ = logging::init_stderr_only(&cfg.logging);
  }

  let host = Arc::new(ServiceHost::new(
    Arc::new(unitrun::catalog(&cfg, &base)),
    cfg.service.clone(),
  ));
  let lifecycle = SystemServiceManager::new(cfg.service.clone());

  dispatch::run(&args, &host, &lifecycle, &mut std::io::stdout());
}

use crate::config::ServiceConfig;
use crate::host::ServiceHost;
use crate::lifecycle::ServiceLifecycle;
use std::sync::Arc;

/// Keyword the installed service is launched with.
pub const SERVICE_LAUNCH_ARG: &str = "service";

/// `ServiceLifecycle` backed by the Windows service control manager.
pub struct SystemServiceManager {
  cfg: ServiceConfig,
}

impl SystemServiceManager {
  pub fn new(cfg: ServiceConfig) -> Self {
    Self { cfg }
  }
}

#[cfg(windows)]
impl ServiceLifecycle for SystemServiceManager {
  fn install(&self, args: &[String]) -> anyhow::Result<()> {
    scm::install(&self.cfg, args)
  }

  fn uninstall(&self) -> anyhow::Result<()> {
    scm::uninstall(&self.cfg)
  }

  fn start(&self) -> anyhow::Result<()> {
    scm::start(&self.cfg)
  }

  fn stop(&self) -> anyhow::Result<()> {
    scm::stop(&self.cfg)
  }

  fn run_blocking(&self, host: &Arc<ServiceHost>, args: &[String]) -> anyhow::Result<()> {
    dispatcher::run(&self.cfg, host, args)
  }
}

#[cfg(not(windows))]
impl ServiceLifecycle for SystemServiceManager {
  fn install(&self, _args: &[String]) -> anyhow::Result<()> {
    Err(unsupported("install", &self.cfg))
  }

  fn uninstall(&self) -> anyhow::Result<()> {
    Err(unsupported("uninstall", &self.cfg))
  }

  fn start(&self) -> anyhow::Result<()> {
    Err(unsupported("start", &self.cfg))
  }

  fn stop(&self) -> anyhow::Result<()> {
    Err(unsupported("stop", &self.cfg))
  }

  fn run_blocking(&self, _host: &Arc<ServiceHost>, _args: &[String]) -> anyhow::Result<()> {
    Err(unsupported("service", &self.cfg))
  }
}

#[cfg(not(windows))]
fn unsupported(action: &str, cfg: &ServiceConfig) -> anyhow::Error {
  anyhow::anyhow!(
    "`{action}` for service {} is only supported on Windows",
    cfg.name
  )
}

#[cfg(windows)]
mod scm {
  use super::SERVICE_LAUNCH_ARG;
  use crate::config::ServiceConfig;
  use anyhow::Context;
  use std::ffi::OsString;
  use windows_service::service::{
    ServiceAccess, ServiceErrorControl, ServiceInfo, ServiceStartType, ServiceState, ServiceType,
  };
  use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

  fn manager(access: ServiceManagerAccess) -> anyhow::Result<ServiceManager> {
    ServiceManager::local_computer(None::<&str>, access).context("connect to service manager")
  }

  pub fn install(cfg: &ServiceConfig, args: &[String]) -> anyhow::Result<()> {
    let manager = manager(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?;

    let mut launch_arguments = vec![OsString::from(SERVICE_LAUNCH_ARG)];
    launch_arguments.extend(args.iter().map(OsString::from));

    let info = ServiceInfo {
      name: OsString::from(&cfg.name),
      display_name: OsString::from(&cfg.display_name),
      service_type: ServiceType::OWN_PROCESS,
      start_type: ServiceStartType::AutoStart,
      error_control: ServiceErrorControl::Normal,
      executable_path: std::env::current_exe().context("resolve current executable")?,
      launch_arguments,
      dependencies: vec![],
      account_name: None,
      account_password: None,
    };

    let service = manager
      .create_service(&info, ServiceAccess::CHANGE_CONFIG)
      .with_context(|| format!("create service {}", cfg.name))?;
    service.set_description(&cfg.description)?;
    Ok(())
  }

  pub fn uninstall(cfg: &ServiceConfig) -> anyhow::Result<()> {
    let manager = manager(ServiceManagerAccess::CONNECT)?;
    let service = manager
      .open_service(
        &cfg.name,
        ServiceAccess::QUERY_STATUS | ServiceAccess::STOP | ServiceAccess::DELETE,
      )
      .with_context(|| format!("open service {}", cfg.name))?;

    if service.query_status()?.current_state != ServiceState::Stopped {
      service.stop().context("stop service before delete")?;
    }
    service.delete()?;
    Ok(())
  }

  pub fn start(cfg: &ServiceConfig) -> anyhow::Result<()> {
    let manager = manager(ServiceManagerAccess::CONNECT)?;
    let service = manager
      .open_service(&cfg.name, ServiceAccess::START)
      .with_context(|| format!("open service {}", cfg.name))?;
    service.start::<&str>(&[])?;
    Ok(())
  }

  pub fn stop(cfg: &ServiceConfig) -> anyhow::Result<()> {
    let manager = manager(ServiceManagerAccess::CONNECT)?;
    let service = manager
      .open_service(&cfg.name, ServiceAccess::STOP)
      .with_context(|| format!("open service {}", cfg.name))?;
    service.stop()?;
    Ok(())
  }
}

#[cfg(windows)]
mod dispatcher {
  use crate::config::ServiceConfig;
  use crate::host::ServiceHost;
  use std::sync::mpsc;
  use std::sync::{Arc, OnceLock};
  use std::time::Duration;
  use windows_service::define_windows_service;
  use windows_service::service::{
    ServiceControl, ServiceControlAccept, ServiceExitCode, ServiceState, ServiceStatus, ServiceType,
  };
  use windows_service::service_control_handler::{self, ServiceControlHandlerResult};
  use windows_service::service_dispatcher;

  struct HostContext {
    name: String,
    host: Arc<ServiceHost>,
    args: Vec<String>,
  }

  static CONTEXT: OnceLock<HostContext> = OnceLock::new();

  define_windows_service!(ffi_service_main, service_main);

  pub fn run(cfg: &ServiceConfig, host: &Arc<ServiceHost>, args: &[String]) -> anyhow::Result<()> {
    CONTEXT
      .set(HostContext {
        name: cfg.name.clone(),
        host: Arc::clone(host),
        args: args.to_vec(),
      })
      .map_err(|_| anyhow::anyhow!("service dispatcher already started"))?;

    service_dispatcher::start(&cfg.name, ffi_service_main)?;
    Ok(())
  }

  fn service_main(_arguments: Vec<std::ffi::OsString>) {
    if let Err(e) = run_service_inner() {
      tracing::error!(error = ?e, "service main exited with error");
    }
  }

  fn run_service_inner() -> anyhow::Result<()> {
    let ctx = CONTEXT
      .get()
      .ok_or_else(|| anyhow::anyhow!("service context missing"))?;

    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let status_handle = service_control_handler::register(&ctx.name, move |control_event| {
      match control_event {
        ServiceControl::Stop | ServiceControl::Shutdown => {
          let _ = stop_tx.send(());
          ServiceControlHandlerResult::NoError
        }
        ServiceControl::Interrogate => ServiceControlHandlerResult::NoError,
        _ => ServiceControlHandlerResult::NotImplemented,
      }
    })?;

    set_service_status(&status_handle, ServiceState::StartPending, 1, Duration::from_secs(10))?;
    tracing::info!(service = %ctx.name, "service starting");
    set_service_status(&status_handle, ServiceState::Running, 0, Duration::default())?;

    if let Err(e) = ctx.host.run(&ctx.args, stop_rx) {
      tracing::error!(error = ?e, "service host loop exited with error");
    }

    set_service_status(&status_handle, ServiceState::Stopped, 0, Duration::default())?;
    tracing::info!(service = %ctx.name, "service stopped");
    Ok(())
  }

  fn set_service_status(
    status_handle: &service_control_handler::ServiceStatusHandle,
    state: ServiceState,
    checkpoint: u32,
    wait_hint: Duration,
  ) -> anyhow::Result<()> {
    let status = ServiceStatus {
      service_type: ServiceType::OWN_PROCESS,
      current_state: state,
      controls_accepted: match state {
        ServiceState::Running => ServiceControlAccept::STOP | ServiceControlAccept::SHUTDOWN,
        _ => ServiceControlAccept::empty(),
      },
      exit_code: ServiceExitCode::Win32(0),
      checkpoint,
      wait_hint,
      process_id: None,
    };
    status_handle.set_service_status(status)?;
    Ok(())
  }
}

#[cfg(all(test, not(windows)))]
mod tests {
  use super::*;
  use crate::lifecycle::tests::empty_host;

  #[test]
  fn operations_report_unsupported_platform() {
    let mgr = SystemServiceManager::new(ServiceConfig::default());
    let err = mgr.install(&[]).unwrap_err().to_string();
    assert!(err.contains("only supported on Windows"));
    assert!(err.contains("UNITRUN_HOST"));
    assert!(mgr.start().is_err());
    assert!(mgr.run_blocking(&empty_host(), &[]).is_err());
  }
}

use crate::command::Command;
use crate::host::{self, ServiceHost};
use crate::runner::catch_failure;
use std::sync::Arc;

/// Operations on the OS-level background service.
pub trait ServiceLifecycle {
  fn install(&self, args: &[String]) -> anyhow::Result<()>;
  fn uninstall(&self) -> anyhow::Result<()>;
  fn start(&self) -> anyhow::Result<()>;
  fn stop(&self) -> anyhow::Result<()>;

  /// Hands the process to the service manager and blocks until the service stops.
  fn run_blocking(&self, host: &Arc<ServiceHost>, args: &[String]) -> anyhow::Result<()>;

  /// Runs the service loop in this process, without the service manager.
  fn run_foreground(&self, host: &Arc<ServiceHost>, args: &[String]) -> anyhow::Result<()> {
    host::run_foreground(host, args)
  }
}

/// Forwards a lifecycle command, logging each phase.
///
/// Install, uninstall, start and stop errors are returned to the caller. The two
/// service-run commands catch and log their failures here and always return `Ok`.
pub fn proxy(
  command: Command,
  lifecycle: &dyn ServiceLifecycle,
  host: &Arc<ServiceHost>,
  args: &[String],
) -> anyhow::Result<()> {
  let action = command.as_str();
  match command {
    Command::Install => {
      tracing::info!(action, phase = "starting", "installing the service");
      lifecycle.install(args)?;
      tracing::info!(action, phase = "completed", "the service is installed");
    }
    Command::Uninstall => {
      tracing::info!(action, phase = "starting", "uninstalling the service");
      lifecycle.uninstall()?;
      tracing::info!(action, phase = "completed", "the service is uninstalled");
    }
    Command::Start => {
      tracing::info!(action, phase = "starting", "starting the service");
      lifecycle.start()?;
      tracing::info!(action, phase = "completed", "the service is started");
    }
    Command::Stop => {
      tracing::info!(action, phase = "starting", "stopping the service");
      lifecycle.stop()?;
      tracing::info!(action, phase = "completed", "the service is stopped");
    }
    Command::RunAsService | Command::RunAsServiceForeground => {
      tracing::info!(action, phase = "starting", "the service execution is starting");
      let res = catch_failure(|| {
        if command == Command::RunAsService {
          lifecycle.run_blocking(host, args)
        } else {
          lifecycle.run_foreground(host, args)
        }
      });
      if let Err(e) = res {
        tracing::error!(action, error = ?e, "the service execution failed");
      }
      tracing::info!(action, phase = "completed", "the service execution has ended");
    }
    Command::RunUnits | Command::Help => {
      return Err(anyhow::anyhow!("`{action}` is not a lifecycle command"));
    }
  }
  Ok(())
}

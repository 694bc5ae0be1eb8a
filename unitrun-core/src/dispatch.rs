use crate::command::{Command, Invocation};
use crate::help;
use crate::host::ServiceHost;
use crate::lifecycle::{self, ServiceLifecycle};
use crate::runner::{self, catch_failure};
use crate::selection;
use std::io::Write;
use std::sync::Arc;

/// Single entry point for one invocation. Never fails: anything escaping a
/// branch is logged as critical and echoed to `console`.
pub fn run(
  args: &[String],
  host: &Arc<ServiceHost>,
  lifecycle: &dyn ServiceLifecycle,
  console: &mut dyn Write,
) -> Option<Command> {
  match catch_failure(|| dispatch(args, host, lifecycle, &mut *console)) {
    Ok(command) => {
      tracing::info!(command = command.as_str(), "dispatch completed");
      Some(command)
    }
    Err(e) => {
      tracing::error!(error = ?e, "the following critical error occurred");
      let _ = writeln!(console, "The following critical error occurred.");
      let _ = writeln!(console, "{e:?}");
      let _ = console.flush();
      None
    }
  }
}

fn dispatch(
  args: &[String],
  host: &Arc<ServiceHost>,
  lifecycle: &dyn ServiceLifecycle,
  console: &mut dyn Write,
) -> anyhow::Result<Command> {
  let invocation = Invocation::parse(args);
  tracing::debug!(
    command = invocation.command.as_str(),
    requested = invocation.requested.len(),
    passthrough = invocation.passthrough.len(),
    "arguments classified"
  );

  match invocation.command {
    Command::RunUnits => {
      let catalog = host.catalog().list_units()?;
      let selected = selection::select_units(catalog, &invocation.requested);
      let report = runner::run_isolated(&selected, &invocation.passthrough);
      tracing::info!(
        requested = invocation.requested.len(),
        selected = selected.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "unit batch finished"
      );
    }
    Command::Help => {
      let catalog = host.catalog().list_units()?;
      help::write_help(console, &catalog)?;
    }
    command => lifecycle::proxy(command, lifecycle, host, &invocation.passthrough)?,
  }

  Ok(invocation.command)
}

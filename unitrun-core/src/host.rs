use crate::config::ServiceConfig;
use crate::identifiers;
use crate::runner;
use crate::selection;
use crate::unit::Discovery;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Everything the service loop needs: the catalog and the `[service]` settings.
pub struct ServiceHost {
  catalog: Arc<dyn Discovery>,
  cfg: ServiceConfig,
}

impl ServiceHost {
  pub fn new(catalog: Arc<dyn Discovery>, cfg: ServiceConfig) -> Self {
    Self { catalog, cfg }
  }

  pub fn catalog(&self) -> &dyn Discovery {
    self.catalog.as_ref()
  }

  pub fn config(&self) -> &ServiceConfig {
    &self.cfg
  }

  pub fn tick(&self) -> Duration {
    Duration::from_secs(self.cfg.interval_seconds.max(1))
  }

  /// Runs the configured units every tick until `stop_rx` fires or its sender is dropped.
  pub fn run(&self, args: &[String], stop_rx: mpsc::Receiver<()>) -> anyhow::Result<()> {
    self.run_with_tick(args, stop_rx, self.tick())
  }

  pub(crate) fn run_with_tick(
    &self,
    args: &[String],
    stop_rx: mpsc::Receiver<()>,
    tick: Duration,
  ) -> anyhow::Result<()> {
    let session = uuid::Uuid::new_v4();
    let requested = identifiers::parse_list(&self.cfg.units);
    if requested.is_empty() {
      tracing::warn!(%session, "no units configured for the service host; idling until stopped");
    }
    tracing::info!(
      %session,
      units = requested.len(),
      tick_seconds = tick.as_secs(),
      "service host loop started"
    );

    let mut cycles: u64 = 0;
    loop {
      let selected = selection::select_units(self.catalog.list_units()?, &requested);
      let report = runner::run_isolated(&selected, args);
      cycles += 1;
      tracing::debug!(
        %session,
        cycle = cycles,
        succeeded = report.succeeded(),
        failed = report.failed(),
        "service host cycle finished"
      );

      match stop_rx.recv_timeout(tick) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        Err(RecvTimeoutError::Timeout) => {}
      }
    }

    tracing::info!(%session, cycles, "service host loop exiting");
    Ok(())
  }
}

/// Runs the host loop on its own thread, stopped by Ctrl-C, and blocks until it returns.
pub fn run_foreground(host: &Arc<ServiceHost>, args: &[String]) -> anyhow::Result<()> {
  let (stop_tx, stop_rx) = mpsc::channel::<()>();
  ctrlc::set_handler(move || {
    let _ = stop_tx.send(());
  })?;

  run_on_thread(host, args, stop_rx)
}

pub(crate) fn run_on_thread(
  host: &Arc<ServiceHost>,
  args: &[String],
  stop_rx: mpsc::Receiver<()>,
) -> anyhow::Result<()> {
  let host = Arc::clone(host);
  let args = args.to_vec();
  let handle = std::thread::Builder::new()
    .name("service-host".to_string())
    .spawn(move || host.run(&args, stop_rx))?;

  match handle.join() {
    Ok(res) => res,
    Err(_) => Err(anyhow::anyhow!("service host thread panicked")),
  }
}

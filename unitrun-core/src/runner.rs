use crate::unit::UnitRef;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
  Succeeded,
  Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
  pub outcomes: Vec<(Uuid, UnitOutcome)>,
}

impl BatchReport {
  pub fn succeeded(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|(_, o)| *o == UnitOutcome::Succeeded)
      .count()
  }

  pub fn failed(&self) -> usize {
    self.outcomes.len() - self.succeeded()
  }
}

/// Runs every unit in order, one at a time. A unit that errors or panics is
/// logged and skipped over; nothing is propagated to the caller.
pub fn run_isolated(units: &[UnitRef], args: &[String]) -> BatchReport {
  let mut report = BatchReport::default();

  for unit in units {
    let unit_id = unit.id();
    tracing::info!(%unit_id, unit_name = unit.name(), "unit execution starting");

    let outcome = match catch_failure(|| unit.run(args)) {
      Ok(()) => UnitOutcome::Succeeded,
      Err(e) => {
        tracing::error!(%unit_id, unit_name = unit.name(), error = ?e, "unit execution failed");
        UnitOutcome::Failed(format!("{e:#}"))
      }
    };

    tracing::info!(%unit_id, unit_name = unit.name(), "unit execution has ended");
    report.outcomes.push((unit_id, outcome));
  }

  report
}

/// Runs `f`, turning a panic into an error so callers only deal with `Result`.
pub(crate) fn catch_failure<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
  match panic::catch_unwind(AssertUnwindSafe(f)) {
    Ok(res) => res,
    Err(payload) => Err(anyhow::anyhow!("panicked: {}", panic_message(payload.as_ref()))),
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.as_str()
  } else {
    "<non-string panic payload>"
  }
}

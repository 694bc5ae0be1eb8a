use std::sync::Arc;
use uuid::Uuid;

/// An independently addressable piece of work selectable from the command line.
pub trait Unit: Send + Sync {
  /// Stable identifier; must be the same value on every call.
  fn id(&self) -> Uuid;

  fn name(&self) -> &str;

  /// `args` are the arguments following the selector token, unchanged.
  fn run(&self, args: &[String]) -> anyhow::Result<()>;
}

pub type UnitRef = Arc<dyn Unit>;

/// Enumerates the units available to this invocation, in catalog order.
pub trait Discovery: Send + Sync {
  fn list_units(&self) -> anyhow::Result<Vec<UnitRef>>;
}

/// Fixed, in-memory catalog.
#[derive(Clone, Default)]
pub struct Catalog {
  units: Vec<UnitRef>,
}

impl Catalog {
  pub fn new(units: Vec<UnitRef>) -> Self {
    Self { units }
  }

  pub fn len(&self) -> usize {
    self.units.len()
  }

  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }
}

impl Discovery for Catalog {
  fn list_units(&self) -> anyhow::Result<Vec<UnitRef>> {
    Ok(self.units.clone())
  }
}

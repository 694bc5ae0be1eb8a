use crate::identifiers::RequestedIdentifiers;
use crate::unit::UnitRef;

/// Keeps the catalog entries whose identifier was requested, in catalog order.
pub fn select_units(catalog: Vec<UnitRef>, requested: &RequestedIdentifiers) -> Vec<UnitRef> {
  catalog
    .into_iter()
    .filter(|unit| {
      let keep = requested.contains(&unit.id());
      if keep {
        tracing::debug!(unit_id = %unit.id(), unit_name = unit.name(), "unit requested");
      } else {
        tracing::debug!(unit_id = %unit.id(), unit_name = unit.name(), "unit available");
      }
      keep
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{capture_logs, Behavior, FakeUnit};
  use std::sync::{Arc, Mutex};
  use uuid::Uuid;

  fn names(units: &[UnitRef]) -> Vec<String> {
    units.iter().map(|u| u.name().to_string()).collect()
  }

  #[test]
  fn output_follows_catalog_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let catalog = vec![
      FakeUnit::new(1, "A", Behavior::Succeed, &calls),
      FakeUnit::new(2, "B", Behavior::Succeed, &calls),
      FakeUnit::new(3, "C", Behavior::Succeed, &calls),
    ];
    let requested: RequestedIdentifiers = [Uuid::from_u128(3), Uuid::from_u128(2)]
      .into_iter()
      .collect();

    let (selected, logs) = capture_logs(|| select_units(catalog, &requested));
    assert_eq!(names(&selected), vec!["B", "C"]);
    assert_eq!(logs.matches("unit requested").count(), 2);
    assert_eq!(logs.matches("unit available").count(), 1);
    assert!(calls.lock().unwrap().is_empty());
  }

  #[test]
  fn unknown_identifiers_select_nothing() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let catalog = vec![FakeUnit::new(1, "A", Behavior::Succeed, &calls)];
    let requested: RequestedIdentifiers = [Uuid::from_u128(9)].into_iter().collect();
    assert!(select_units(catalog, &requested).is_empty());
  }

  #[test]
  fn empty_request_selects_nothing() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let catalog = vec![
      FakeUnit::new(1, "A", Behavior::Succeed, &calls),
      FakeUnit::new(2, "B", Behavior::Succeed, &calls),
    ];
    assert!(select_units(catalog, &RequestedIdentifiers::default()).is_empty());
  }
}

//! Fakes and a log-capturing subscriber shared by the unit tests.

use crate::unit::{Discovery, Unit, UnitRef};
use std::io;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Runs `f` with a debug-level subscriber scoped to this thread and returns
/// its result together with everything that was logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
  let buf = SharedBuf::default();
  let writer = buf.clone();
  let subscriber = tracing_subscriber::fmt()
    .with_ansi(false)
    .with_max_level(tracing::Level::DEBUG)
    .with_writer(move || writer.clone())
    .finish();

  let out = tracing::subscriber::with_default(subscriber, f);
  let logs = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
  (out, logs)
}

pub enum Behavior {
  Succeed,
  Fail(&'static str),
  Panic(&'static str),
}

pub struct FakeUnit {
  pub id: Uuid,
  pub name: String,
  pub behavior: Behavior,
  pub calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl FakeUnit {
  pub fn new(
    n: u128,
    name: &str,
    behavior: Behavior,
    calls: &Arc<Mutex<Vec<(String, Vec<String>)>>>,
  ) -> UnitRef {
    Arc::new(Self {
      id: Uuid::from_u128(n),
      name: name.to_string(),
      behavior,
      calls: calls.clone(),
    })
  }
}

impl Unit for FakeUnit {
  fn id(&self) -> Uuid {
    self.id
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn run(&self, args: &[String]) -> anyhow::Result<()> {
    self
      .calls
      .lock()
      .unwrap()
      .push((self.name.clone(), args.to_vec()));
    match self.behavior {
      Behavior::Succeed => Ok(()),
      Behavior::Fail(msg) => Err(anyhow::anyhow!(msg)),
      Behavior::Panic(msg) => panic!("{msg}"),
    }
  }
}

pub struct BrokenDiscovery;

impl Discovery for BrokenDiscovery {
  fn list_units(&self) -> anyhow::Result<Vec<UnitRef>> {
    Err(anyhow::anyhow!("unit discovery failed"))
  }
}

pub struct PanickingDiscovery;

impl Discovery for PanickingDiscovery {
  fn list_units(&self) -> anyhow::Result<Vec<UnitRef>> {
    panic!("catalog index corrupted")
  }
}

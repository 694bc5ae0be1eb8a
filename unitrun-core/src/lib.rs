pub mod command;
pub mod config;
pub mod dispatch;
pub mod help;
pub mod host;
pub mod identifiers;
pub mod lifecycle;
pub mod logging;
pub mod paths;
pub mod runner;
pub mod selection;
pub mod service;
pub mod unit;

#[cfg(test)]
mod test_support;

pub use command::{Command, Invocation};
pub use host::ServiceHost;
pub use lifecycle::ServiceLifecycle;
pub use service::SystemServiceManager;
pub use unit::{Catalog, Discovery, Unit, UnitRef};

use crate::identifiers::{self, RequestedIdentifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Install,
  Uninstall,
  Start,
  Stop,
  RunAsService,
  /// Runs the service host loop in this process without the service manager.
  /// Diagnostic aid; the real service can only start from a local disk.
  RunAsServiceForeground,
  RunUnits,
  Help,
}

impl Command {
  pub fn from_keyword(token: &str) -> Option<Self> {
    match token.to_lowercase().as_str() {
      "i" | "install" => Some(Self::Install),
      "u" | "uninstall" => Some(Self::Uninstall),
      "start" => Some(Self::Start),
      "stop" => Some(Self::Stop),
      "service" => Some(Self::RunAsService),
      "programservice" => Some(Self::RunAsServiceForeground),
      _ => None,
    }
  }

  pub fn is_lifecycle(self) -> bool {
    !matches!(self, Self::RunUnits | Self::Help)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Install => "install",
      Self::Uninstall => "uninstall",
      Self::Start => "start",
      Self::Stop => "stop",
      Self::RunAsService => "service",
      Self::RunAsServiceForeground => "programservice",
      Self::RunUnits => "run-units",
      Self::Help => "help",
    }
  }
}

/// One process invocation: the selected branch, the identifiers it asked for
/// and the arguments forwarded untouched to that branch.
#[derive(Debug, Clone)]
pub struct Invocation {
  pub command: Command,
  pub requested: RequestedIdentifiers,
  pub passthrough: Vec<String>,
}

impl Invocation {
  pub fn parse(args: &[String]) -> Self {
    let (selector, passthrough) = match args.split_first() {
      Some((first, rest)) => (first.as_str(), rest.to_vec()),
      None => ("", Vec::new()),
    };

    let parsed = identifiers::parse_selector(selector);
    let command = classify(selector, parsed.looks_like_identifier_list);
    Self {
      command,
      requested: parsed.requested,
      passthrough,
    }
  }
}

/// Identifier lists win over keywords; anything unrecognised is `Help`.
pub fn classify(selector: &str, looks_like_identifier_list: bool) -> Command {
  if looks_like_identifier_list {
    return Command::RunUnits;
  }
  Command::from_keyword(selector).unwrap_or(Command::Help)
}

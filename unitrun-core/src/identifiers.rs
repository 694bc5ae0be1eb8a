use uuid::Uuid;

pub const SEPARATORS: [char; 2] = [',', ';'];

/// Deduplicated set of unit identifiers requested on the command line.
///
/// Insertion order is kept for diagnostics only; membership is what selection uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedIdentifiers {
  ids: Vec<Uuid>,
}

impl RequestedIdentifiers {
  pub fn contains(&self, id: &Uuid) -> bool {
    self.ids.contains(id)
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
    self.ids.iter()
  }

  fn insert(&mut self, id: Uuid) -> bool {
    if id.is_nil() || self.ids.contains(&id) {
      return false;
    }
    self.ids.push(id);
    true
  }
}

impl FromIterator<Uuid> for RequestedIdentifiers {
  fn from_iter<T: IntoIterator<Item = Uuid>>(iter: T) -> Self {
    let mut out = Self::default();
    for id in iter {
      out.insert(id);
    }
    out
  }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSelector {
  pub requested: RequestedIdentifiers,
  pub looks_like_identifier_list: bool,
}

/// Splits `token` on `,` and `;` and keeps every piece that parses to a non-nil UUID.
/// Malformed, nil and duplicate pieces are dropped without error.
///
/// Accepted forms are hyphenated, 32 bare hex digits and braced; `urn:uuid:` is rejected.
pub fn parse_selector(token: &str) -> ParsedSelector {
  let mut parsed = ParsedSelector::default();
  for piece in token.split(SEPARATORS) {
    let Some(id) = parse_identifier(piece) else {
      continue;
    };
    if parsed.requested.insert(id) {
      parsed.looks_like_identifier_list = true;
    }
  }
  parsed
}

/// Same as [`parse_selector`] over a list of strings, as found in the config file.
pub fn parse_list<S: AsRef<str>>(items: &[S]) -> RequestedIdentifiers {
  items
    .iter()
    .flat_map(|s| s.as_ref().split(SEPARATORS))
    .filter_map(parse_identifier)
    .collect()
}

fn parse_identifier(piece: &str) -> Option<Uuid> {
  let piece = piece.trim();
  if piece.is_empty() || piece.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("urn:")) {
    return None;
  }
  Uuid::parse_str(piece).ok().filter(|id| !id.is_nil())
}

use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Deterministic identifier for a catalog request.
///
/// A key is a resource type followed by its ordered parameters, rendered as
/// a compact JSON array: `["movie", 42]` becomes `["movie",42]`. Keys built
/// with [`RequestKey::entity`] also remember the entity id they address so
/// loaders can consult the prefetch tier before going to the network.
#[derive(Debug, Clone)]
pub struct RequestKey {
  rendered: String,
  entity_id: Option<u64>,
}

impl RequestKey {
  /// Build a key from ordered parts.
  pub fn new<I, V>(parts: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
  {
    let parts: Vec<Value> = parts.into_iter().map(Into::into).collect();
    Self {
      rendered: Value::Array(parts).to_string(),
      entity_id: None,
    }
  }

  /// Build a key for a single entity, e.g. `RequestKey::entity("movie", 42)`.
  pub fn entity(resource: &str, id: u64) -> Self {
    Self {
      entity_id: Some(id),
      ..Self::new([Value::from(resource), Value::from(id)])
    }
  }

  /// The rendered key string.
  pub fn as_str(&self) -> &str {
    &self.rendered
  }

  /// Entity id this key addresses, if it was built with [`RequestKey::entity`].
  pub fn entity_id(&self) -> Option<u64> {
    self.entity_id
  }
}

// Identity is the rendered string only.
impl PartialEq for RequestKey {
  fn eq(&self, other: &Self) -> bool {
    self.rendered == other.rendered
  }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.rendered.hash(state);
  }
}

impl fmt::Display for RequestKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.rendered)
  }
}

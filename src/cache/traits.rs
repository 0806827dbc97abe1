//! Core traits for values that flow through the session caches.

/// Trait for catalog payloads that address a single entity.
///
/// The id drives list de-duplication and the prefetch tier. Payloads that
/// carry no usable id return `None` and are dropped by both.
pub trait CatalogEntity {
  /// Catalog id of this entity, if it has one.
  fn entity_id(&self) -> Option<u64>;

  /// Entity type name used in log lines (e.g., "movie", "person")
  fn entity_type() -> &'static str;
}

/// Catalog ids are never zero; a zero id means the field was missing.
pub fn nonzero_id(id: u64) -> Option<u64> {
  (id != 0).then_some(id)
}

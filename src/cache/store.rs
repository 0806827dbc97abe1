//! Type-erased in-memory response store.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::key::RequestKey;

/// Shared, type-erased payload.
type Payload = Arc<dyn Any + Send + Sync>;

/// Session-wide map from request key to resolved payload.
///
/// Cloning the cache clones the handle, not the entries. Values are stored
/// behind `Arc<dyn Any>` and downcast on read, so a lookup with the wrong
/// type behaves like a miss.
#[derive(Clone, Default)]
pub struct ResourceCache {
  entries: Arc<Mutex<HashMap<RequestKey, Payload>>>,
}

impl ResourceCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Look up a resolved payload.
  pub fn get<T: Any + Send + Sync>(&self, key: &RequestKey) -> Option<Arc<T>> {
    let payload = self.lock().get(key).cloned()?;
    payload.downcast::<T>().ok()
  }

  /// Store a resolved payload under `key`.
  pub fn set<T: Any + Send + Sync>(&self, key: &RequestKey, value: Arc<T>) {
    self.lock().insert(key.clone(), value as Payload);
  }

  /// Forget one entry. Returns whether it was present.
  pub fn remove(&self, key: &RequestKey) -> bool {
    self.lock().remove(key).is_some()
  }

  pub fn contains(&self, key: &RequestKey) -> bool {
    self.lock().contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Drop every entry.
  pub fn clear(&self) {
    self.lock().clear();
  }

  // A panic while holding the lock cannot leave a half-written HashMap entry,
  // so a poisoned lock is still safe to use.
  fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, Payload>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl fmt::Debug for ResourceCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceCache")
      .field("entries", &self.len())
      .finish()
  }
}

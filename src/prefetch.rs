//! Speculative prefetching driven by intent signals.
//!
//! When the selection rests on a list item, the browse view asks the
//! scheduler to fetch that item's detail payload. The request only goes out
//! once the selection has stayed put for the configured delay; moving on
//! re-arms the timer for the new item instead. Resolved payloads land in an
//! id-keyed side store that detail loaders check before hitting the network.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::CatalogEntity;

type Payload = Arc<dyn Any + Send + Sync>;

/// Default delay between the last schedule call and the request.
pub const DEFAULT_PREFETCH_DELAY: Duration = Duration::from_millis(120);

/// Id-keyed store of prefetched payloads.
///
/// Entries are typed: a movie prefetched under id 42 is invisible to a
/// caller asking for a series with id 42. The first resolution for an id
/// wins and is never replaced.
#[derive(Clone, Default)]
pub struct PrefetchStore {
  entries: Arc<Mutex<HashMap<(TypeId, u64), Payload>>>,
}

impl PrefetchStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Get a prefetched payload for `id`.
  pub fn get<T: Any + Send + Sync>(&self, id: u64) -> Option<Arc<T>> {
    let payload = self.lock().get(&(TypeId::of::<T>(), id)).cloned()?;
    payload.downcast::<T>().ok()
  }

  /// Insert unless an entry for this id already exists.
  /// Returns whether the value was stored.
  pub fn insert<T: Any + Send + Sync>(&self, id: u64, value: Arc<T>) -> bool {
    let mut entries = self.lock();
    let slot = (TypeId::of::<T>(), id);
    if entries.contains_key(&slot) {
      return false;
    }
    entries.insert(slot, value as Payload);
    true
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Drop every prefetched payload.
  pub fn clear(&self) {
    self.lock().clear();
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<(TypeId, u64), Payload>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Single-slot, latest-wins prefetch timer.
///
/// Clones share the timer slot, so a session holds exactly one armed timer
/// no matter how many views schedule through it.
#[derive(Clone)]
pub struct PrefetchScheduler {
  delay: Duration,
  store: PrefetchStore,
  armed: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Default for PrefetchScheduler {
  fn default() -> Self {
    Self::new(DEFAULT_PREFETCH_DELAY)
  }
}

impl PrefetchScheduler {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      store: PrefetchStore::new(),
      armed: Arc::new(Mutex::new(None)),
    }
  }

  /// Handle to the read side.
  pub fn store(&self) -> PrefetchStore {
    self.store.clone()
  }

  /// Synchronous lookup of a prefetched payload.
  pub fn get_prefetched<T: Any + Send + Sync>(&self, id: u64) -> Option<Arc<T>> {
    self.store.get(id)
  }

  /// Arm the timer for `producer`, cancelling any timer that has not fired yet.
  ///
  /// Once the timer fires the producer runs in its own task, so a later
  /// `schedule` call no longer affects a request that is already out.
  /// Failures and payloads without an id are dropped silently.
  pub fn schedule<T, F, Fut>(&self, producer: F)
  where
    T: CatalogEntity + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let store = self.store.clone();
    let delay = self.delay;

    let timer = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      tokio::spawn(async move {
        match producer().await {
          Ok(payload) => match payload.entity_id() {
            Some(id) => {
              if store.insert(id, Arc::new(payload)) {
                debug!(entity = T::entity_type(), id, "prefetched");
              }
            }
            None => debug!(entity = T::entity_type(), "prefetched payload has no id"),
          },
          Err(error) => debug!(entity = T::entity_type(), %error, "prefetch failed"),
        }
      });
    });

    if let Some(previous) = self.lock_armed().replace(timer) {
      previous.abort();
    }
  }

  /// Disarm the pending timer, if any.
  pub fn cancel(&self) {
    if let Some(pending) = self.lock_armed().take() {
      pending.abort();
    }
  }

  /// True while a timer is waiting to fire.
  pub fn is_armed(&self) -> bool {
    self
      .lock_armed()
      .as_ref()
      .is_some_and(|timer| !timer.is_finished())
  }

  fn lock_armed(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    self.armed.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

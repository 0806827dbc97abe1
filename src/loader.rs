//! Cached, stale-guarded loading of single resources.
//!
//! `ResourceLoader<T>` spawns a producer on the runtime, receives its result
//! over a channel and applies it from the owner's tick in `poll()`. Before
//! spawning it checks the session cache and then the prefetch tier, so a
//! resource that was already resolved is published synchronously.
//!
//! # Example
//!
//! ```ignore
//! let mut loader = session.loader::<MovieDetails>();
//! let catalog = session.catalog().clone();
//! loader.load(RequestKey::entity("movie", 42), move || {
//!     let catalog = catalog.clone();
//!     async move { catalog.movie(42).await.map_err(|e| e.to_string()) }
//! });
//!
//! // In event loop tick
//! if loader.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::cache::{RequestKey, ResourceCache};
use crate::prefetch::PrefetchStore;

/// The state of a loader
#[derive(Debug)]
pub enum LoadState<T> {
  /// Nothing requested yet
  Idle,
  /// Producer is in flight for the active key
  Loading,
  /// Resolved payload for the active key
  Ready(Arc<T>),
  /// The producer failed for the active key
  Failed(String),
}

// Manual impl: `Arc<T>` clones without `T: Clone`.
impl<T> Clone for LoadState<T> {
  fn clone(&self) -> Self {
    match self {
      LoadState::Idle => LoadState::Idle,
      LoadState::Loading => LoadState::Loading,
      LoadState::Ready(data) => LoadState::Ready(Arc::clone(data)),
      LoadState::Failed(error) => LoadState::Failed(error.clone()),
    }
  }
}

impl<T> LoadState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, LoadState::Loading)
  }

  pub fn data(&self) -> Option<&Arc<T>> {
    match self {
      LoadState::Ready(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      LoadState::Failed(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;
type ProducerFn<T> = Arc<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// A finished producer, tagged with the key it was issued for.
struct Resolution<T> {
  key: RequestKey,
  result: Result<T, String>,
}

/// Loader for one resource at a time, keyed by [`RequestKey`].
pub struct ResourceLoader<T> {
  cache: ResourceCache,
  prefetched: Option<PrefetchStore>,
  state: LoadState<T>,
  active: Option<RequestKey>,
  producer: Option<ProducerFn<T>>,
  sender: mpsc::UnboundedSender<Resolution<T>>,
  receiver: mpsc::UnboundedReceiver<Resolution<T>>,
}

impl<T: Send + Sync + 'static> ResourceLoader<T> {
  pub fn new(cache: ResourceCache) -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    Self {
      cache,
      prefetched: None,
      state: LoadState::Idle,
      active: None,
      producer: None,
      sender,
      receiver,
    }
  }

  /// Also consult a prefetch store before issuing a producer.
  pub fn with_prefetched(mut self, store: PrefetchStore) -> Self {
    self.prefetched = Some(store);
    self
  }

  pub fn state(&self) -> &LoadState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&Arc<T>> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Make `key` the active resource.
  ///
  /// Cache and prefetch hits are published before this returns. Calling
  /// again with the active key while it is loading or loaded is a no-op; after
  /// a failure it retries. Switching keys abandons whatever was in flight for
  /// the previous key.
  pub fn load<F, Fut>(&mut self, key: RequestKey, producer: F) -> &LoadState<T>
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let same_key = self.active.as_ref() == Some(&key);
    if same_key && matches!(self.state, LoadState::Loading | LoadState::Ready(_)) {
      return &self.state;
    }

    self.producer = Some(Arc::new(move || Box::pin(producer())));
    self.active = Some(key.clone());

    if let Some(hit) = self.cache.get::<T>(&key) {
      trace!(%key, "cache hit");
      self.state = LoadState::Ready(hit);
      return &self.state;
    }

    if let Some(hit) = self.prefetched_hit(&key) {
      debug!(%key, "using prefetched payload");
      self.cache.set(&key, Arc::clone(&hit));
      self.state = LoadState::Ready(hit);
      return &self.state;
    }

    self.start_fetch(key);
    &self.state
  }

  /// Drop the cached value for the active key and fetch it again.
  pub fn reload(&mut self) {
    if let Some(key) = self.active.clone() {
      self.cache.remove(&key);
      self.start_fetch(key);
    }
  }

  /// Apply any finished producers.
  ///
  /// Returns `true` if the state changed. Resolutions for a key other than
  /// the active one are dropped without touching the state or the cache.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(resolution) = self.receiver.try_recv() {
      changed |= self.apply(resolution);
    }
    changed
  }

  fn apply(&mut self, resolution: Resolution<T>) -> bool {
    let Resolution { key, result } = resolution;
    if self.active.as_ref() != Some(&key) {
      trace!(%key, "discarding stale resolution");
      return false;
    }

    match result {
      Ok(value) => {
        let value = Arc::new(value);
        self.cache.set(&key, Arc::clone(&value));
        self.state = LoadState::Ready(value);
      }
      Err(error) => {
        warn!(%key, %error, "load failed");
        self.state = LoadState::Failed(error);
      }
    }
    true
  }

  fn prefetched_hit(&self, key: &RequestKey) -> Option<Arc<T>> {
    let id = key.entity_id()?;
    self.prefetched.as_ref()?.get::<T>(id)
  }

  fn start_fetch(&mut self, key: RequestKey) {
    let Some(producer) = self.producer.clone() else {
      return;
    };
    self.state = LoadState::Loading;

    let sender = self.sender.clone();
    let future = producer();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the loader may have been dropped
      let _ = sender.send(Resolution { key, result });
    });
  }
}

impl<T: fmt::Debug> fmt::Debug for ResourceLoader<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceLoader")
      .field("active", &self.active)
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;

  fn counter() -> Arc<AtomicU32> {
    Arc::new(AtomicU32::new(0))
  }

  #[tokio::test]
  async fn test_load_success() {
    let mut loader = ResourceLoader::new(ResourceCache::new());
    assert!(matches!(loader.state(), LoadState::Idle));

    loader.load(RequestKey::entity("movie", 1), || async { Ok::<_, String>(vec![1, 2, 3]) });
    assert!(loader.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(loader.poll());
    assert_eq!(loader.data().map(|d| d.as_slice()), Some(&[1, 2, 3][..]));
  }

  #[tokio::test]
  async fn test_second_load_is_served_from_cache() {
    let cache = ResourceCache::new();
    let calls = counter();
    let key = RequestKey::entity("movie", 42);

    let producer = {
      let calls = calls.clone();
      move || {
        let calls = calls.clone();
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok::<_, String>(String::from("The Dark Knight"))
        }
      }
    };

    let mut first = ResourceLoader::new(cache.clone());
    first.load(key.clone(), producer.clone());
    tokio::time::sleep(Duration::from_millis(10)).await;
    first.poll();
    let first_value = Arc::clone(first.data().unwrap());

    let mut second = ResourceLoader::new(cache.clone());
    let state = second.load(key, producer);
    let second_value = Arc::clone(state.data().unwrap());

    assert!(Arc::ptr_eq(&first_value, &second_value));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_failure_is_not_cached() {
    let cache = ResourceCache::new();
    let key = RequestKey::entity("tv", 7);
    let mut loader: ResourceLoader<String> = ResourceLoader::new(cache.clone());

    loader.load(key.clone(), || async { Err("503 Service Unavailable".to_string()) });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(loader.poll());
    assert_eq!(loader.error(), Some("503 Service Unavailable"));
    assert!(!cache.contains(&key));

    // Same key after a failure retries
    loader.load(key.clone(), || async { Ok("Twin Peaks".to_string()) });
    assert!(loader.is_loading());
    tokio::time::sleep(Duration::from_millis(10)).await;
    loader.poll();
    assert_eq!(loader.data().map(|d| d.as_str()), Some("Twin Peaks"));
    assert!(cache.contains(&key));
  }

  #[tokio::test(start_paused = true)]
  async fn test_stale_resolution_is_discarded() {
    let cache = ResourceCache::new();
    let mut loader = ResourceLoader::new(cache.clone());
    let old_key = RequestKey::entity("movie", 1);
    let new_key = RequestKey::entity("movie", 2);

    loader.load(old_key.clone(), || async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok::<_, String>("old")
    });
    loader.load(new_key.clone(), || async {
      tokio::time::sleep(Duration::from_millis(200)).await;
      Ok::<_, String>("new")
    });

    // Old producer finishes first and must not surface
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!loader.poll());
    assert!(loader.is_loading());
    assert!(!cache.contains(&old_key));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(loader.poll());
    assert_eq!(loader.data().map(|d| **d), Some("new"));
    assert!(cache.contains(&new_key));
    assert!(!cache.contains(&old_key));
  }

  #[tokio::test(start_paused = true)]
  async fn test_load_while_loading_is_noop() {
    let calls = counter();
    let mut loader = ResourceLoader::new(ResourceCache::new());
    let key = RequestKey::entity("person", 3);

    for _ in 0..3 {
      let calls = calls.clone();
      loader.load(key.clone(), move || {
        let calls = calls.clone();
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          tokio::time::sleep(Duration::from_millis(100)).await;
          Ok::<_, String>(3u64)
        }
      });
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    loader.poll();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_prefetched_payload_short_circuits() {
    let cache = ResourceCache::new();
    let store = PrefetchStore::new();
    store.insert(42, Arc::new(String::from("prefetched")));

    let calls = counter();
    let mut loader = ResourceLoader::new(cache.clone()).with_prefetched(store);
    let key = RequestKey::entity("movie", 42);
    let producer_calls = calls.clone();
    let state = loader.load(key.clone(), move || {
      let calls = producer_calls.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(String::from("network"))
      }
    });

    assert_eq!(state.data().map(|d| d.as_str()), Some("prefetched"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(cache.contains(&key));
  }

  #[tokio::test]
  async fn test_reload_replaces_cached_value() {
    let cache = ResourceCache::new();
    let calls = counter();
    let key = RequestKey::entity("movie", 5);
    let mut loader = ResourceLoader::new(cache.clone());

    let producer_calls = calls.clone();
    loader.load(key.clone(), move || {
      let calls = producer_calls.clone();
      async move { Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst)) }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    loader.poll();
    assert_eq!(loader.data().map(|d| **d), Some(0));

    loader.reload();
    assert!(loader.is_loading());
    assert!(!cache.contains(&key));
    tokio::time::sleep(Duration::from_millis(10)).await;
    loader.poll();
    assert_eq!(loader.data().map(|d| **d), Some(1));
    assert_eq!(cache.get::<u32>(&key).map(|d| *d), Some(1));
  }
}

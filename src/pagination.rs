//! Incremental (infinite-scroll) list loading.
//!
//! A [`ListController`] owns one paginated list: the page counter, the items
//! merged so far and a [`ListPhase`]. Pages are fetched on the runtime and
//! merged in `poll()`. The phase machine is:
//!
//! ```text
//! Idle -> LoadingInitial -> Ready <-> LoadingMore -> Exhausted
//!              ^__________________ reset ________________|
//! ```
//!
//! `advance()` is only honoured in `Ready`, which is what keeps a sentinel
//! that fires on every frame from issuing overlapping page requests.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::cache::{CatalogEntity, RequestKey};

/// One fetched page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub page: u32,
  pub results: Vec<T>,
  pub total_pages: Option<u32>,
  pub total_results: Option<u64>,
}

impl<T> Page<T> {
  /// Page with results and no totals.
  pub fn new(page: u32, results: Vec<T>) -> Self {
    Self {
      page,
      results,
      total_pages: None,
      total_results: None,
    }
  }

  pub fn empty(page: u32) -> Self {
    Self::new(page, Vec::new())
  }
}

/// Where a list is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
  /// No criteria yet
  Idle,
  /// First page for the current criteria is in flight
  LoadingInitial,
  /// Idle with more pages available
  Ready,
  /// A follow-up page is in flight
  LoadingMore,
  /// Last page was empty or failed; nothing more to fetch
  Exhausted,
}

type PageFuture<T> = BoxFuture<'static, Result<Page<T>, String>>;
type PageFetcher<T> = Arc<dyn Fn(u32) -> PageFuture<T> + Send + Sync>;

struct PageResolution<T> {
  generation: u64,
  page: u32,
  result: Result<Page<T>, String>,
}

/// State machine and merge logic for one paginated list.
pub struct ListController<T> {
  query_key: Option<RequestKey>,
  items: Vec<T>,
  page: u32,
  phase: ListPhase,
  error: Option<String>,
  total_results: Option<u64>,
  generation: u64,
  fetcher: Option<PageFetcher<T>>,
  sender: mpsc::UnboundedSender<PageResolution<T>>,
  receiver: mpsc::UnboundedReceiver<PageResolution<T>>,
}

impl<T: CatalogEntity + Send + 'static> Default for ListController<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: CatalogEntity + Send + 'static> ListController<T> {
  pub fn new() -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    Self {
      query_key: None,
      items: Vec::new(),
      page: 1,
      phase: ListPhase::Idle,
      error: None,
      total_results: None,
      generation: 0,
      fetcher: None,
      sender,
      receiver,
    }
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn phase(&self) -> ListPhase {
    self.phase
  }

  pub fn query_key(&self) -> Option<&RequestKey> {
    self.query_key.as_ref()
  }

  pub fn has_more(&self) -> bool {
    self.phase != ListPhase::Exhausted
  }

  /// True until the first page for the current criteria resolves.
  pub fn loading_initial(&self) -> bool {
    self.phase == ListPhase::LoadingInitial
  }

  pub fn loading_more(&self) -> bool {
    self.phase == ListPhase::LoadingMore
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Total result count reported by the most recent page.
  pub fn total_results(&self) -> Option<u64> {
    self.total_results
  }

  /// Switch to new criteria and fetch page 1.
  ///
  /// Everything from the previous criteria is cleared before the fetch goes
  /// out, and pages still in flight for it are ignored when they land. The
  /// same key as the current one is a no-op.
  pub fn reset<F, Fut>(&mut self, query_key: RequestKey, fetcher: F)
  where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, String>> + Send + 'static,
  {
    if self.phase != ListPhase::Idle && self.query_key.as_ref() == Some(&query_key) {
      return;
    }
    debug!(key = %query_key, "list reset");
    self.query_key = Some(query_key);
    self.fetcher = Some(Arc::new(move |page| fetcher(page).boxed()));
    self.restart();
  }

  /// Start over with the current criteria (user-initiated refresh).
  pub fn reload(&mut self) {
    if self.fetcher.is_some() {
      self.restart();
    }
  }

  /// Request the next page.
  ///
  /// Returns whether a fetch was issued. Only a `Ready` list advances; while
  /// a page is in flight or the list is exhausted this does nothing.
  pub fn advance(&mut self) -> bool {
    if self.phase != ListPhase::Ready {
      return false;
    }
    self.page += 1;
    self.phase = ListPhase::LoadingMore;
    self.issue(self.page);
    true
  }

  /// Merge any pages that arrived. Returns `true` if the list changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(resolution) = self.receiver.try_recv() {
      changed |= self.apply(resolution);
    }
    changed
  }

  fn restart(&mut self) {
    self.generation += 1;
    self.items.clear();
    self.page = 1;
    self.error = None;
    self.total_results = None;
    self.phase = ListPhase::LoadingInitial;
    self.issue(1);
  }

  fn apply(&mut self, resolution: PageResolution<T>) -> bool {
    if resolution.generation != self.generation || resolution.page != self.page {
      trace!(page = resolution.page, "discarding page for superseded criteria");
      return false;
    }

    match resolution.result {
      Ok(page) => {
        let received = page.results.len();
        if page.total_results.is_some() {
          self.total_results = page.total_results;
        }
        let previous = std::mem::take(&mut self.items);
        self.items = merge_unique(previous, page.results, resolution.page);
        self.phase = if received > 0 {
          ListPhase::Ready
        } else {
          ListPhase::Exhausted
        };
        trace!(page = resolution.page, received, total = self.items.len(), "page merged");
      }
      Err(error) => {
        warn!(page = resolution.page, %error, "page fetch failed");
        self.error = Some(error);
        self.phase = ListPhase::Exhausted;
      }
    }
    true
  }

  fn issue(&self, page: u32) {
    let Some(fetcher) = self.fetcher.clone() else {
      return;
    };
    let generation = self.generation;
    let sender = self.sender.clone();
    let future = fetcher(page);
    tokio::spawn(async move {
      let result = future.await;
      let _ = sender.send(PageResolution {
        generation,
        page,
        result,
      });
    });
  }
}

/// Merge a fetched page into the accumulated items.
///
/// Page 1 replaces everything. The merged sequence is de-duplicated by id
/// keeping the first occurrence; items without an id are dropped.
pub fn merge_unique<T: CatalogEntity>(items: Vec<T>, results: Vec<T>, page: u32) -> Vec<T> {
  let merged = if page == 1 {
    results
  } else {
    let mut merged = items;
    merged.extend(results);
    merged
  };

  let mut seen = HashSet::new();
  merged
    .into_iter()
    .filter(|item| item.entity_id().is_some_and(|id| seen.insert(id)))
    .collect()
}

impl<T> fmt::Debug for ListController<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ListController")
      .field("query_key", &self.query_key)
      .field("items", &self.items.len())
      .field("page", &self.page)
      .field("phase", &self.phase)
      .field("error", &self.error)
      .finish_non_exhaustive()
  }
}

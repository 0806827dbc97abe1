//! Per-run service object.
//!
//! A [`Session`] owns the catalog client, the response cache and the
//! prefetch scheduler. Views receive a clone; all clones share the same
//! cache and prefetch store.

use color_eyre::Result;

use crate::cache::ResourceCache;
use crate::catalog::{CatalogClient, ImageUrls};
use crate::config::{Config, TimingConfig};
use crate::loader::ResourceLoader;
use crate::prefetch::PrefetchScheduler;

#[derive(Clone)]
pub struct Session {
  catalog: CatalogClient,
  images: ImageUrls,
  cache: ResourceCache,
  prefetch: PrefetchScheduler,
  timing: TimingConfig,
}

impl Session {
  pub fn new(config: &Config) -> Result<Self> {
    let catalog = CatalogClient::new(config)?;
    Ok(Self::with_client(config, catalog))
  }

  pub fn with_client(config: &Config, catalog: CatalogClient) -> Self {
    Self {
      catalog,
      images: ImageUrls::new(&config.catalog.image_base),
      cache: ResourceCache::new(),
      prefetch: PrefetchScheduler::new(config.timing.prefetch_delay()),
      timing: config.timing,
    }
  }

  pub fn catalog(&self) -> &CatalogClient {
    &self.catalog
  }

  pub fn images(&self) -> &ImageUrls {
    &self.images
  }

  pub fn cache(&self) -> &ResourceCache {
    &self.cache
  }

  pub fn prefetch(&self) -> &PrefetchScheduler {
    &self.prefetch
  }

  pub fn timing(&self) -> TimingConfig {
    self.timing
  }

  /// A loader backed by this session's cache that also reads prefetched payloads.
  pub fn loader<T: Send + Sync + 'static>(&self) -> ResourceLoader<T> {
    ResourceLoader::new(self.cache.clone()).with_prefetched(self.prefetch.store())
  }
}

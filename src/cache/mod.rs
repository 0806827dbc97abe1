//! Per-session response caching.
//!
//! This module provides the in-memory cache shared by every loader in a
//! session:
//! - `RequestKey` derives a deterministic key from a resource type and its
//!   ordered parameters
//! - `ResourceCache` maps those keys to resolved payloads of any type
//! - `CatalogEntity` exposes the entity id used by de-duplication and prefetch
//!
//! Entries never expire and are never evicted; they live until the session
//! is dropped.

mod key;
mod store;
mod traits;

pub use key::RequestKey;
pub use store::ResourceCache;
pub use traits::{nonzero_id, CatalogEntity};

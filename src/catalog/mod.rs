//! Remote catalog access: HTTP client, response types, request keys and
//! image URLs.

pub mod api_types;
mod cache;
pub mod client;
pub mod images;
pub mod types;

pub use cache::CatalogQuery;
pub use client::CatalogClient;
pub use images::{ImageSize, ImageUrls};
pub use types::*;

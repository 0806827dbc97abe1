//! Image URL assembly.
//!
//! The catalog references images by relative path; a full URL is the CDN
//! base, a size bucket and that path.

/// Returned when an entity has no image.
pub const PLACEHOLDER_IMAGE: &str = "/no-image.png";

/// Named size bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
  Small,
  #[default]
  Medium,
  Large,
}

/// Builds image URLs against a CDN base.
#[derive(Debug, Clone)]
pub struct ImageUrls {
  base: String,
}

impl ImageUrls {
  pub fn new(base: &str) -> Self {
    Self {
      base: base.trim_end_matches('/').to_string(),
    }
  }

  pub fn poster(&self, path: Option<&str>, size: ImageSize) -> String {
    let bucket = match size {
      ImageSize::Small => "w185",
      ImageSize::Medium => "w342",
      ImageSize::Large => "w500",
    };
    self.build(path, bucket)
  }

  pub fn backdrop(&self, path: Option<&str>, size: ImageSize) -> String {
    let bucket = match size {
      ImageSize::Small => "w300",
      ImageSize::Medium => "w780",
      ImageSize::Large => "original",
    };
    self.build(path, bucket)
  }

  pub fn still(&self, path: Option<&str>) -> String {
    self.build(path, "w300")
  }

  pub fn profile(&self, path: Option<&str>) -> String {
    self.build(path, "w185")
  }

  fn build(&self, path: Option<&str>, bucket: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
      Some(path) => format!("{}/{}{}", self.base, bucket, path),
      None => PLACEHOLDER_IMAGE.to_string(),
    }
  }
}

use crate::debounce::DEFAULT_SEARCH_DEBOUNCE;
use crate::prefetch::DEFAULT_PREFETCH_DELAY;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub catalog: CatalogConfig,
  #[serde(default)]
  pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  /// API base URL, without trailing slash
  #[serde(default = "default_catalog_url")]
  pub url: String,
  /// CDN base for image paths
  #[serde(default = "default_image_base")]
  pub image_base: String,
  /// Response language (e.g., "en-US"); catalog default when unset
  pub language: Option<String>,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      url: default_catalog_url(),
      image_base: default_image_base(),
      language: None,
    }
  }
}

fn default_catalog_url() -> String {
  DEFAULT_CATALOG_URL.to_string()
}

fn default_image_base() -> String {
  DEFAULT_IMAGE_BASE.to_string()
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
  /// Quiet period before search input is applied
  #[serde(default = "default_search_debounce_ms")]
  pub search_debounce_ms: u64,
  /// Selection dwell time before the detail payload is prefetched
  #[serde(default = "default_prefetch_delay_ms")]
  pub prefetch_delay_ms: u64,
}

impl Default for TimingConfig {
  fn default() -> Self {
    Self {
      search_debounce_ms: default_search_debounce_ms(),
      prefetch_delay_ms: default_prefetch_delay_ms(),
    }
  }
}

fn default_search_debounce_ms() -> u64 {
  DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64
}

fn default_prefetch_delay_ms() -> u64 {
  DEFAULT_PREFETCH_DELAY.as_millis() as u64
}

impl TimingConfig {
  pub fn search_debounce(&self) -> Duration {
    Duration::from_millis(self.search_debounce_ms)
  }

  pub fn prefetch_delay(&self) -> Duration {
    Duration::from_millis(self.prefetch_delay_ms)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./cinedex.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cinedex/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cinedex.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cinedex").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not a mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Get the catalog bearer token from environment variables.
  ///
  /// Checks CINEDEX_TMDB_TOKEN first, then TMDB_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("CINEDEX_TMDB_TOKEN")
      .or_else(|_| std::env::var("TMDB_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "TMDB access token not found. Set CINEDEX_TMDB_TOKEN or TMDB_API_TOKEN environment variable."
        )
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults_when_sections_missing() {
    let config = Config::parse("catalog:\n  language: fr-FR\n").unwrap();
    assert_eq!(config.catalog.url, DEFAULT_CATALOG_URL);
    assert_eq!(config.catalog.image_base, DEFAULT_IMAGE_BASE);
    assert_eq!(config.catalog.language.as_deref(), Some("fr-FR"));
    assert_eq!(config.timing, TimingConfig::default());
  }

  #[test]
  fn test_timing_overrides() {
    let config = Config::parse("timing:\n  search_debounce_ms: 500\n").unwrap();
    assert_eq!(config.timing.search_debounce(), Duration::from_millis(500));
    assert_eq!(config.timing.prefetch_delay(), Duration::from_millis(120));
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::parse("  \n").unwrap();
    assert_eq!(config.catalog.url, DEFAULT_CATALOG_URL);
  }

  #[test]
  fn test_load_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "catalog:\n  url: http://localhost:9000/3").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.catalog.url, "http://localhost:9000/3");
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(Config::load(Some(&missing)).is_err());
  }

  #[test]
  fn test_invalid_yaml_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "timing: just-a-string").unwrap();
    assert!(Config::load(Some(file.path())).is_err());
  }
}

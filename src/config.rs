use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::delivery::{DeliveryEndpoint, DEFAULT_BASE_URL, DEFAULT_PATH};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "DELIVERABLE_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub pagination: PaginationConfig,
  #[serde(default)]
  pub images: ImageConfig,
  /// Favorites database location (defaults to the platform data directory)
  pub favorites_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_path")]
  pub path: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      path: default_path(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
  #[serde(default = "default_items_per_page")]
  pub items_per_page: u32,
}

impl Default for PaginationConfig {
  fn default() -> Self {
    Self {
      items_per_page: default_items_per_page(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ImageConfig {
  fn default() -> Self {
    Self {
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_path() -> String {
  DEFAULT_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_items_per_page() -> u32 {
  20
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./deliverable.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/deliverable/config.yaml
  ///
  /// Without a file the built-in defaults apply. `DELIVERABLE_API_URL`
  /// overrides the API base URL either way.
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

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      config.api.base_url = url;
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("deliverable.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("deliverable").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.pagination.items_per_page == 0 {
      return Err(eyre!("pagination.items_per_page must be at least 1"));
    }
    self.endpoint()?;
    Ok(())
  }

  /// The delivery list endpoint described by `api`.
  pub fn endpoint(&self) -> Result<DeliveryEndpoint> {
    DeliveryEndpoint::new(
      &self.api.base_url,
      &self.api.path,
      Duration::from_secs(self.api.timeout_secs),
    )
    .map_err(|e| eyre!("Invalid API URL {}{}: {}", self.api.base_url, self.api.path, e))
  }

  pub fn image_timeout(&self) -> Duration {
    Duration::from_secs(self.images.timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.api.path, DEFAULT_PATH);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.pagination.items_per_page, 20);
    assert!(config.favorites_path.is_none());
  }

  #[test]
  fn test_partial_yaml_fills_defaults() {
    let config = Config::from_yaml(
      r#"
api:
  base_url: http://localhost:9000
pagination:
  items_per_page: 5
"#,
    )
    .unwrap();

    assert_eq!(config.api.base_url, "http://localhost:9000");
    assert_eq!(config.api.path, DEFAULT_PATH);
    assert_eq!(config.pagination.items_per_page, 5);
    assert_eq!(config.image_timeout(), Duration::from_secs(30));
    assert_eq!(
      config.endpoint().unwrap().url().as_str(),
      "http://localhost:9000/v2/deliveries"
    );
  }

  #[test]
  fn test_zero_page_size_is_rejected() {
    let config = Config::from_yaml("pagination:\n  items_per_page: 0\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_invalid_url_is_rejected() {
    let config = Config::from_yaml("api:\n  base_url: not a url\n").unwrap();
    assert!(config.endpoint().is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/deliverable.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}

//! Pipeline configuration loader describing directories, caches, filters and assets.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::models::AssetType;
use crate::project::AssetLayout;

/// File name looked up by [`PipelineConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "asset_frontend.config.json";

/// Discoverable configuration for the asset pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Root directory of authored sources.
  pub resource_dir: String,
  /// Public directory compiled assets are written to.
  pub asset_dir: String,
  /// URL path the asset directory is served from.
  pub asset_url: String,
  /// Directory for the compiled-asset cache. No compiled cache is used when absent.
  pub compiled_cache_dir: Option<String>,
  /// Whether resolved URLs are memoized in memory.
  pub url_cache: bool,
  /// Prefix the built-in `CssRewrite` filter adds to relative stylesheet URLs.
  pub css_rewrite_base: String,
  /// Filters to register, in order.
  pub filters: Vec<FilterDeclaration>,
  /// Assets to register, in order.
  pub assets: Vec<AssetDeclaration>,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      resource_dir: "resources".into(),
      asset_dir: "public/assets".into(),
      asset_url: "/assets".into(),
      compiled_cache_dir: None,
      url_cache: true,
      css_rewrite_base: String::new(),
      filters: Vec::new(),
      assets: Vec::new(),
    }
  }
}

/// Filter registration entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterDeclaration {
  /// Name the filter is registered under (prefixed with the type tag).
  pub name: String,
  /// Identifier resolved through the filter registry.
  pub filter: String,
  /// Asset type whose chain the filter joins.
  #[serde(rename = "type")]
  pub asset_type: AssetType,
}

/// Asset registration entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssetDeclaration {
  /// Single file asset.
  File {
    /// Asset type.
    #[serde(rename = "type")]
    asset_type: AssetType,
    /// Asset name.
    name: String,
    /// Source path relative to the type directory, or absolute.
    path: String,
  },
  /// Glob asset.
  Glob {
    /// Asset type.
    #[serde(rename = "type")]
    asset_type: AssetType,
    /// Asset name.
    name: String,
    /// Pattern relative to the type directory, or absolute.
    pattern: String,
  },
  /// Collection of resource tokens (`@name`, globs and files).
  Collection {
    /// Asset type.
    #[serde(rename = "type")]
    asset_type: AssetType,
    /// Asset name.
    name: String,
    /// Resource tokens in output order.
    resources: Vec<String>,
  },
  /// Reference to another registered asset.
  Reference {
    /// Asset type.
    #[serde(rename = "type")]
    asset_type: AssetType,
    /// Asset name.
    name: String,
    /// Name of the referenced asset.
    target: String,
  },
}

impl PipelineConfig {
  /// Load configuration from `dir`, falling back to defaults.
  ///
  /// A missing file yields the defaults silently; a file that fails to parse is logged and
  /// also yields the defaults so callers can keep operating with sensible assumptions.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.is_file() {
      return Self::default();
    }

    Self::from_path(&candidate).unwrap_or_else(|err| {
      warn!("ignoring {}: {err}", candidate.display());
      Self::default()
    })
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> PipelineResult<Self> {
    let content = fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
    serde_json::from_str(&content).map_err(|source| PipelineError::Config {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Borrowing conversion into a layout, cloning the underlying strings.
  pub fn to_layout(&self) -> AssetLayout {
    AssetLayout {
      resource_dir: self.resource_dir.clone(),
      asset_dir: self.asset_dir.clone(),
      asset_url: self.asset_url.clone(),
    }
  }

  /// Path of the compiled-asset cache directory, if one is configured.
  pub fn compiled_cache_path(&self) -> Option<PathBuf> {
    self.compiled_cache_dir.as_ref().map(PathBuf::from)
  }
}

//! Filesystem and URL layout shared by registration and resolution.

use crate::asset_paths::resolve_resource_path;
use crate::models::AssetType;

/// Where sources live, where compiled output goes, and the URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
  /// Root of the authored sources; each type has its own sub-directory below it.
  pub resource_dir: String,
  /// Public directory compiled assets are written to.
  pub asset_dir: String,
  /// URL path the asset directory is served from, without a trailing slash.
  pub asset_url: String,
}

impl AssetLayout {
  /// Resolve a raw source reference for `asset_type`.
  pub fn resource_path(&self, asset_type: AssetType, raw: &str) -> String {
    resolve_resource_path(&self.resource_dir, asset_type.subpath(), raw)
  }

  /// Public URL of a compiled file of `asset_type`.
  pub fn asset_url_for(&self, asset_type: AssetType, file_name: &str) -> String {
    format!(
      "{}/{}/{}",
      self.asset_url.trim_end_matches('/'),
      asset_type.tag(),
      file_name
    )
  }
}

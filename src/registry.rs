//! Name-keyed storage of asset definitions.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{AssetDefinition, AssetName, AssetType};

/// Format a raw name as an asset name of `asset_type`.
///
/// A leading `@` is stripped, and the `{tag}_` prefix is added unless the name already starts
/// with it. Formatting an already formatted name returns it unchanged.
pub fn format_name(raw: &str, asset_type: AssetType) -> AssetName {
  let name = raw.strip_prefix('@').unwrap_or(raw);
  let prefix = asset_type.name_prefix();
  if name.starts_with(&prefix) {
    AssetName(name.to_string())
  } else {
    AssetName(format!("{prefix}{name}"))
  }
}

/// Registered asset definitions, keyed by formatted name.
#[derive(Debug, Default, Clone)]
pub struct AssetRegistry {
  assets: BTreeMap<AssetName, AssetDefinition>,
}

impl AssetRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Store `definition` under `name`, replacing any earlier definition.
  pub fn register(&mut self, name: AssetName, definition: AssetDefinition) -> &AssetDefinition {
    match self.assets.entry(name) {
      Entry::Occupied(mut entry) => {
        entry.insert(definition);
        entry.into_mut()
      }
      Entry::Vacant(entry) => entry.insert(definition),
    }
  }

  /// Definition registered under `name`.
  pub fn get(&self, name: &str) -> PipelineResult<&AssetDefinition> {
    self
      .assets
      .get(name)
      .ok_or_else(|| PipelineError::UnknownAsset {
        name: name.to_string(),
      })
  }

  /// Whether `name` is registered.
  pub fn contains(&self, name: &str) -> bool {
    self.assets.contains_key(name)
  }

  /// Registered names in sorted order.
  pub fn names(&self) -> impl Iterator<Item = &AssetName> {
    self.assets.keys()
  }

  /// Number of registered assets.
  pub fn len(&self) -> usize {
    self.assets.len()
  }

  /// Whether nothing has been registered yet.
  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }
}

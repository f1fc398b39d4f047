use std::collections::BTreeMap;
use std::sync::Arc;

use crate::filters::{Filter, FilterHandle};
use crate::models::{AssetName, AssetType};

/// Filters recorded per asset type, plus the ordered chain new definitions inherit.
#[derive(Debug, Default, Clone)]
pub struct FilterManager {
  filters: BTreeMap<AssetType, BTreeMap<AssetName, FilterHandle>>,
  chains: BTreeMap<AssetType, Vec<FilterHandle>>,
}

impl FilterManager {
  /// Create an empty manager.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `filter` under `(asset_type, name)` and add it to that type's chain.
  ///
  /// Re-registering a name replaces the earlier filter in place, keeping its chain position.
  pub fn set(
    &mut self,
    asset_type: AssetType,
    name: AssetName,
    filter: Arc<dyn Filter>,
  ) -> FilterHandle {
    let handle = FilterHandle::new(name.clone(), filter);
    let chain = self.chains.entry(asset_type).or_default();
    match chain.iter_mut().find(|existing| existing.name() == &name) {
      Some(existing) => *existing = handle.clone(),
      None => chain.push(handle.clone()),
    }
    self
      .filters
      .entry(asset_type)
      .or_default()
      .insert(name, handle.clone());
    handle
  }

  /// Look up a filter registered for `asset_type`.
  pub fn get(&self, asset_type: AssetType, name: &str) -> Option<&FilterHandle> {
    self.filters.get(&asset_type)?.get(name)
  }

  /// Current chain of filters for `asset_type`, in registration order.
  pub fn chain(&self, asset_type: AssetType) -> &[FilterHandle] {
    self
      .chains
      .get(&asset_type)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }
}

//! Content filters and the bookkeeping that attaches them to asset types.
//!
//! A [`Filter`] transforms asset text at compile time. Filters are created from string
//! identifiers through a [`FilterRegistry`] during startup and recorded per asset type in a
//! [`FilterManager`], whose per-type chain is snapshotted into every definition registered
//! afterwards.

mod manager;
mod registry;

use std::fmt;
use std::sync::Arc;

use crate::models::AssetName;

pub use manager::FilterManager;
pub use registry::{FilterFactory, FilterRegistry};

/// Transformation applied to asset content when it is compiled.
pub trait Filter: Send + Sync {
  /// Identifier the filter is known by in a [`FilterRegistry`].
  fn identifier(&self) -> &str;

  /// Transform the given content.
  fn apply(&self, content: &str) -> String;

  /// Dedicated hash of the filter configuration, when the filter provides one.
  fn hash(&self) -> Option<String> {
    None
  }

  /// Stable serialization of the filter configuration.
  ///
  /// Used for cache key derivation when [`Filter::hash`] returns `None`. Filters carrying
  /// configuration must include it here so that changing it changes the derived key.
  fn serialize_config(&self) -> String {
    serde_json::json!({ "filter": self.identifier() }).to_string()
  }
}

/// Named filter instance as attached to asset definitions.
#[derive(Clone)]
pub struct FilterHandle {
  name: AssetName,
  filter: Arc<dyn Filter>,
}

impl FilterHandle {
  pub(crate) fn new(name: AssetName, filter: Arc<dyn Filter>) -> Self {
    Self { name, filter }
  }

  /// Registered name, prefixed with the asset type tag.
  pub fn name(&self) -> &AssetName {
    &self.name
  }

  /// Shared filter instance.
  pub fn filter(&self) -> &dyn Filter {
    self.filter.as_ref()
  }

  /// Contribution of this filter to a cache key.
  pub fn fingerprint(&self) -> String {
    self
      .filter
      .hash()
      .unwrap_or_else(|| self.filter.serialize_config())
  }
}

impl fmt::Debug for FilterHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FilterHandle")
      .field("name", &self.name)
      .field("identifier", &self.filter.identifier())
      .finish()
  }
}

impl PartialEq for FilterHandle {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name && Arc::ptr_eq(&self.filter, &other.filter)
  }
}

/// How a filter is supplied to [`crate::manager::AssetManager::add_filter`].
#[derive(Clone)]
pub enum FilterSpec {
  /// Identifier looked up in the filter registry.
  Identifier(String),
  /// Ready-made instance.
  Instance(Arc<dyn Filter>),
}

impl From<&str> for FilterSpec {
  fn from(identifier: &str) -> Self {
    FilterSpec::Identifier(identifier.to_string())
  }
}

impl From<String> for FilterSpec {
  fn from(identifier: String) -> Self {
    FilterSpec::Identifier(identifier)
  }
}

impl From<Arc<dyn Filter>> for FilterSpec {
  fn from(filter: Arc<dyn Filter>) -> Self {
    FilterSpec::Instance(filter)
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use super::Filter;

  /// Appends a fixed marker; configuration is the marker itself.
  pub struct Suffix(pub &'static str);

  impl Filter for Suffix {
    fn identifier(&self) -> &str {
      "Suffix"
    }

    fn apply(&self, content: &str) -> String {
      format!("{content}{}", self.0)
    }

    fn serialize_config(&self) -> String {
      serde_json::json!({ "filter": "Suffix", "marker": self.0 }).to_string()
    }
  }

  /// Upper-cases content and reports a dedicated hash.
  pub struct Upper;

  impl Filter for Upper {
    fn identifier(&self) -> &str {
      "Upper"
    }

    fn apply(&self, content: &str) -> String {
      content.to_uppercase()
    }

    fn hash(&self) -> Option<String> {
      Some("upper-v1".into())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::test_support::{Suffix, Upper};
  use super::*;
  use crate::models::AssetType;
  use crate::registry::format_name;

  #[test]
  fn fingerprint_prefers_dedicated_hash() {
    let handle = FilterHandle::new(format_name("upper", AssetType::Style), Arc::new(Upper));
    assert_eq!(handle.fingerprint(), "upper-v1");
  }

  #[test]
  fn fingerprint_falls_back_to_serialized_config() {
    let handle = FilterHandle::new(format_name("mark", AssetType::Style), Arc::new(Suffix("!")));
    assert_eq!(handle.fingerprint(), r#"{"filter":"Suffix","marker":"!"}"#);
  }

  #[test]
  fn handles_compare_by_name_and_instance() {
    let shared: Arc<dyn Filter> = Arc::new(Upper);
    let name = format_name("upper", AssetType::Script);
    let a = FilterHandle::new(name.clone(), shared.clone());
    let b = FilterHandle::new(name.clone(), shared);
    let c = FilterHandle::new(name, Arc::new(Upper));
    assert_eq!(a, b);
    assert_ne!(a, c);
  }
}

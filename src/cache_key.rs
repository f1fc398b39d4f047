//! Deterministic keys and file names for compiled assets.
//!
//! Keys double as cache lookup keys and output file names, so the same asset state must always
//! produce the same key across processes and deploys.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::filters::FilterHandle;

/// Salt used when deriving the key of a dumped (fully compiled) asset.
pub const DUMP_SALT: &str = "dump";

/// Asset state that feeds into a cache key.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeyParts<'a> {
  /// Directory the sources were read from.
  pub source_root: Option<&'a str>,
  /// Source path relative to `source_root`.
  pub source_path: Option<&'a str>,
  /// Output path, when one has been assigned.
  pub target_path: Option<&'a str>,
  /// Most recent modification time of any source, in seconds since the Unix epoch.
  pub last_modified: Option<u64>,
  /// Filters applied to the content, in chain order.
  pub filters: &'a [FilterHandle],
  /// Additional values the content depends on.
  pub values: &'a BTreeMap<String, String>,
}

/// Derive the cache key for an asset state.
///
/// The digest covers, in order: source root, source path, target path, modification time,
/// each filter's dedicated hash (or its serialized configuration), the extra values sorted
/// by key when any are present, and finally `salt`.
pub fn derive_cache_key(parts: &CacheKeyParts<'_>, salt: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(parts.source_root.unwrap_or_default());
  hasher.update(parts.source_path.unwrap_or_default());
  hasher.update(parts.target_path.unwrap_or_default());
  if let Some(modified) = parts.last_modified {
    hasher.update(modified.to_string());
  }

  for filter in parts.filters {
    hasher.update(filter.fingerprint());
  }

  if !parts.values.is_empty() {
    // BTreeMap serializes in key order
    let serialized = serde_json::to_string(parts.values).unwrap_or_default();
    hasher.update(serialized);
  }

  hasher.update(salt);
  hex::encode(hasher.finalize())
}

/// Digest of an asset name, used for output names when no compiled cache is configured.
pub fn name_digest(name: &str) -> String {
  hex::encode(Sha256::digest(name.as_bytes()))
}

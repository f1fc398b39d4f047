//! Data structures describing registered assets.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::filters::FilterHandle;

/// Kind of asset managed by the pipeline.
///
/// Every type owns a short tag used in asset names, output directories and URLs, plus the
/// sub-directory its sources live under inside the resource root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
  /// JavaScript sources.
  #[serde(rename = "js")]
  Script,
  /// Stylesheets.
  #[serde(rename = "css")]
  Style,
  /// Web fonts.
  #[serde(rename = "font")]
  Font,
  /// Images, audio and video.
  #[serde(rename = "media")]
  Media,
}

impl AssetType {
  /// Every supported asset type.
  pub const ALL: [AssetType; 4] = [
    AssetType::Script,
    AssetType::Style,
    AssetType::Font,
    AssetType::Media,
  ];

  /// Tag used as the asset name prefix and the output directory.
  pub const fn tag(self) -> &'static str {
    match self {
      AssetType::Script => "js",
      AssetType::Style => "css",
      AssetType::Font => "font",
      AssetType::Media => "media",
    }
  }

  /// Sub-directory of the resource root holding sources of this type.
  pub const fn subpath(self) -> &'static str {
    match self {
      AssetType::Script => "js",
      AssetType::Style => "css",
      AssetType::Font => "fonts",
      AssetType::Media => "media",
    }
  }

  /// Prefix every asset name of this type starts with, e.g. `css_`.
  pub fn name_prefix(self) -> String {
    format!("{}_", self.tag())
  }
}

impl fmt::Display for AssetType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

impl FromStr for AssetType {
  type Err = PipelineError;

  fn from_str(tag: &str) -> Result<Self, Self::Err> {
    AssetType::ALL
      .into_iter()
      .find(|asset_type| asset_type.tag() == tag)
      .ok_or_else(|| PipelineError::UnknownAssetType {
        tag: tag.to_string(),
      })
  }
}

/// Name of a registered asset, always of the form `{tag}_{identifier}`.
///
/// Values are produced by [`crate::registry::format_name`], which strips the `@` reference sigil
/// and adds the type prefix when it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AssetName(pub(crate) String);

impl AssetName {
  /// Borrow the underlying string.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Type tag taken from the text before the first underscore.
  pub fn type_tag(&self) -> &str {
    type_tag_of(&self.0)
  }
}

/// Type tag of a raw asset name: everything before the first `_`, or the whole name.
pub fn type_tag_of(name: &str) -> &str {
  name.split_once('_').map(|(tag, _)| tag).unwrap_or(name)
}

impl fmt::Display for AssetName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for AssetName {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl Borrow<str> for AssetName {
  fn borrow(&self) -> &str {
    &self.0
  }
}

/// Definition stored in the registry for a named asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetDefinition {
  /// A single source file.
  File {
    /// Resolved path of the file.
    path: String,
    /// Filters applied to the file content, in order.
    filters: Vec<FilterHandle>,
  },
  /// Every file matching a pattern, expanded when compiled.
  Glob {
    /// Resolved glob pattern.
    pattern: String,
    /// Filters applied to the concatenated matches, in order.
    filters: Vec<FilterHandle>,
  },
  /// Ordered group of assets compiled into one output.
  Collection {
    /// Child definitions in output order.
    children: Vec<AssetDefinition>,
    /// Filters applied to the concatenated children, in order.
    filters: Vec<FilterHandle>,
  },
  /// Pointer to another registered asset; filters come from the target.
  Reference {
    /// Registry name of the referenced asset.
    target: AssetName,
  },
}

impl AssetDefinition {
  /// Filters attached directly to this definition. References never carry any.
  pub fn filters(&self) -> &[FilterHandle] {
    match self {
      AssetDefinition::File { filters, .. }
      | AssetDefinition::Glob { filters, .. }
      | AssetDefinition::Collection { filters, .. } => filters,
      AssetDefinition::Reference { .. } => &[],
    }
  }

  /// Short label for log output.
  pub fn kind(&self) -> &'static str {
    match self {
      AssetDefinition::File { .. } => "file",
      AssetDefinition::Glob { .. } => "glob",
      AssetDefinition::Collection { .. } => "collection",
      AssetDefinition::Reference { .. } => "reference",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_type_tags() {
    assert_eq!("css".parse::<AssetType>().unwrap(), AssetType::Style);
    assert_eq!("font".parse::<AssetType>().unwrap(), AssetType::Font);
    assert!("fonts".parse::<AssetType>().is_err());
  }

  #[test]
  fn maps_types_to_storage_subpaths() {
    let subpaths: Vec<_> = AssetType::ALL.iter().map(|t| t.subpath()).collect();
    assert_eq!(subpaths, vec!["js", "css", "fonts", "media"]);
  }

  #[test]
  fn takes_type_tag_before_first_underscore() {
    assert_eq!(type_tag_of("css_site_main"), "css");
    assert_eq!(type_tag_of("plain"), "plain");
  }

  #[test]
  fn references_expose_no_filters() {
    let reference = AssetDefinition::Reference {
      target: AssetName("css_base".into()),
    };
    assert!(reference.filters().is_empty());
    assert_eq!(reference.kind(), "reference");
  }
}

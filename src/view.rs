//! Templating-side helpers that swap `@name` placeholders for asset URLs.
//!
//! Templates refer to registered assets with an `@` sigil, e.g. a stylesheet link with
//! `href="@site"`. These helpers resolve such values and leave everything else alone. They
//! never fail: an unresolvable asset produces an empty URL (or keeps the original value for
//! links and scripts) so page rendering carries on.

use crate::models::AssetType;
use crate::service::AssetService;

/// MIME type of scripts whose `src` is eligible for substitution.
pub const JAVASCRIPT_MIME: &str = "text/javascript";

/// View helper resolving asset URLs for templates.
#[derive(Default, Clone, Copy)]
pub struct AssetsHelper<'a> {
  service: Option<&'a AssetService>,
}

impl<'a> AssetsHelper<'a> {
  /// Helper resolving through `service`.
  pub fn new(service: &'a AssetService) -> Self {
    Self {
      service: Some(service),
    }
  }

  /// Attach the service templates resolve through.
  pub fn set_asset_service(&mut self, service: &'a AssetService) -> &mut Self {
    self.service = Some(service);
    self
  }

  /// URL of asset `name` of type tag `asset_type`, or an empty string.
  ///
  /// A leading `@` on `name` is ignored. Without an attached service every lookup is empty.
  pub fn assets(&self, asset_type: &str, name: &str) -> String {
    let Some(service) = self.service else {
      return String::new();
    };

    let name = name.strip_prefix('@').unwrap_or(name);
    service.get_url(&format!("{asset_type}_{name}"))
  }

  /// Resolve a stylesheet link `href`.
  ///
  /// `@name` values are replaced by the style asset URL when it resolves; any other value, or
  /// one that fails to resolve, is returned unchanged.
  pub fn stylesheet_href(&self, href: &str) -> String {
    self.substitute(AssetType::Style, href)
  }

  /// Resolve a script `src`.
  ///
  /// Only `text/javascript` scripts with an `@name` source are substituted.
  pub fn script_src(&self, mime: &str, src: &str) -> String {
    if mime != JAVASCRIPT_MIME {
      return src.to_string();
    }
    self.substitute(AssetType::Script, src)
  }

  fn substitute(&self, asset_type: AssetType, value: &str) -> String {
    if !value.starts_with('@') {
      return value.to_string();
    }

    let url = self.assets(asset_type.tag(), value);
    if url.is_empty() {
      value.to_string()
    } else {
      url
    }
  }
}

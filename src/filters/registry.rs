use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::bundle::styles::{CSS_REWRITE_FILTER, CssRewriteFilter};
use crate::error::{PipelineError, PipelineResult};
use crate::filters::Filter;

/// Constructor producing a fresh filter instance.
pub type FilterFactory = Box<dyn Fn() -> Arc<dyn Filter> + Send + Sync>;

/// Startup-time lookup table from string identifiers to filter factories.
#[derive(Default)]
pub struct FilterRegistry {
  factories: BTreeMap<String, FilterFactory>,
}

impl FilterRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry preloaded with the built-in filters.
  ///
  /// `css_rewrite_base` configures the `CssRewrite` filter: relative stylesheet URLs are
  /// prefixed with it.
  pub fn with_defaults(css_rewrite_base: &str) -> Self {
    let mut registry = Self::new();
    let base = css_rewrite_base.to_string();
    registry.register(CSS_REWRITE_FILTER, move || {
      Arc::new(CssRewriteFilter::with_base(base.clone()))
    });
    registry
  }

  /// Register a factory under `identifier`, replacing any previous one.
  pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
  where
    F: Fn() -> Arc<dyn Filter> + Send + Sync + 'static,
  {
    self.factories.insert(identifier.into(), Box::new(factory));
  }

  /// Instantiate the filter registered under `identifier`.
  pub fn create(&self, identifier: &str) -> PipelineResult<Arc<dyn Filter>> {
    self
      .factories
      .get(identifier)
      .map(|factory| factory())
      .ok_or_else(|| PipelineError::UnknownFilter {
        identifier: identifier.to_string(),
      })
  }

  /// Whether a factory exists for `identifier`.
  pub fn contains(&self, identifier: &str) -> bool {
    self.factories.contains_key(identifier)
  }

  /// Registered identifiers in sorted order.
  pub fn identifiers(&self) -> impl Iterator<Item = &str> {
    self.factories.keys().map(String::as_str)
  }
}

impl fmt::Debug for FilterRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FilterRegistry")
      .field("identifiers", &self.factories.keys().collect::<Vec<_>>())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filters::test_support::Upper;

  #[test]
  fn creates_builtin_css_rewrite() {
    let registry = FilterRegistry::with_defaults("../media");
    let filter = registry.create("CssRewrite").unwrap();
    assert_eq!(filter.identifier(), "CssRewrite");
    assert_eq!(
      filter.apply("a { background: url(img/a.png) }"),
      "a { background: url(../media/img/a.png) }"
    );
  }

  #[test]
  fn fails_on_unknown_identifier() {
    let registry = FilterRegistry::new();
    let err = registry.create("Yui").err().unwrap();
    assert!(matches!(err, PipelineError::UnknownFilter { identifier } if identifier == "Yui"));
  }

  #[test]
  fn custom_factories_replace_previous_entries() {
    let mut registry = FilterRegistry::with_defaults("");
    registry.register("CssRewrite", || Arc::new(Upper));
    assert_eq!(registry.create("CssRewrite").unwrap().identifier(), "Upper");
    assert_eq!(registry.identifiers().collect::<Vec<_>>(), vec!["CssRewrite"]);
  }
}

//! Stylesheet helpers keeping relative `url()` references valid after bundling.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};

use crate::asset_paths::should_skip_url_rewrite;
use crate::filters::Filter;

/// Identifier of [`CssRewriteFilter`] in the filter registry.
pub const CSS_REWRITE_FILTER: &str = "CssRewrite";

fn css_url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)url\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^"'()\s]*))\s*\)"#)
      .expect("invalid css url regex")
  })
}

/// Rewrite every relative `url(...)` reference in `css` through `resolve`.
///
/// Quoted and bare forms are recognised. URLs that are absolute, protocol-relative, data URIs,
/// root-relative or empty are left alone, as is any URL the resolver returns unchanged. A
/// replacement only touches the URL span of its own `url(...)` token; quotes, whitespace and
/// the rest of the document pass through byte for byte.
pub fn rewrite_css_urls<F>(css: &str, mut resolve: F) -> String
where
  F: FnMut(&str) -> String,
{
  css_url_pattern()
    .replace_all(css, |caps: &Captures<'_>| {
      let whole = caps.get(0).expect("capture group 0 always matches");
      let Some(url) = caps
        .name("dq")
        .or_else(|| caps.name("sq"))
        .or_else(|| caps.name("bare"))
      else {
        return whole.as_str().to_string();
      };

      if url.as_str().is_empty() || should_skip_url_rewrite(url.as_str()) {
        return whole.as_str().to_string();
      }

      let resolved = resolve(url.as_str());
      if resolved == url.as_str() {
        return whole.as_str().to_string();
      }

      let start = url.start() - whole.start();
      let end = url.end() - whole.start();
      let token = whole.as_str();
      format!("{}{}{}", &token[..start], resolved, &token[end..])
    })
    .into_owned()
}

/// Join a relative URL onto `base`. An empty base leaves the URL as written.
pub fn prefix_relative_url(base: &str, url: &str) -> String {
  let base = base.trim_end_matches('/');
  if base.is_empty() {
    url.to_string()
  } else {
    format!("{base}/{url}")
  }
}

type UrlResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Filter fixing relative stylesheet URLs once the stylesheet has been moved into the bundle.
#[derive(Clone)]
pub struct CssRewriteFilter {
  fingerprint: String,
  resolver: UrlResolver,
}

impl CssRewriteFilter {
  /// Prefix every relative URL with `base`.
  pub fn with_base(base: impl Into<String>) -> Self {
    let base = base.into();
    let fingerprint = base.clone();
    Self {
      fingerprint,
      resolver: Arc::new(move |url: &str| prefix_relative_url(&base, url)),
    }
  }

  /// Resolve relative URLs with a custom function.
  ///
  /// `fingerprint` identifies the resolver's behaviour for cache key purposes: two filters with
  /// different resolution rules must not share a fingerprint.
  pub fn with_resolver<F>(fingerprint: impl Into<String>, resolver: F) -> Self
  where
    F: Fn(&str) -> String + Send + Sync + 'static,
  {
    Self {
      fingerprint: fingerprint.into(),
      resolver: Arc::new(resolver),
    }
  }
}

impl fmt::Debug for CssRewriteFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CssRewriteFilter")
      .field("fingerprint", &self.fingerprint)
      .finish()
  }
}

impl Filter for CssRewriteFilter {
  fn identifier(&self) -> &str {
    CSS_REWRITE_FILTER
  }

  fn apply(&self, content: &str) -> String {
    rewrite_css_urls(content, |url| (self.resolver)(url))
  }

  fn hash(&self) -> Option<String> {
    Some(format!("{CSS_REWRITE_FILTER}:{}", self.fingerprint))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cdn(url: &str) -> String {
    url.replace("images/", "cdn/")
  }

  #[test]
  fn leaves_text_without_urls_untouched() {
    let css = "body { color: red; }\n/* url-less */";
    assert_eq!(rewrite_css_urls(css, |_| "changed".into()), css);
  }

  #[test]
  fn rewrites_bare_relative_url() {
    let css = "background: url(images/a.png)";
    assert_eq!(rewrite_css_urls(css, cdn), "background: url(cdn/a.png)");
  }

  #[test]
  fn preserves_quotes_and_inner_whitespace() {
    let css = r#"a { src: url( "images/a.woff" ) format("woff"); b: url('images/b.png') }"#;
    assert_eq!(
      rewrite_css_urls(css, cdn),
      r#"a { src: url( "cdn/a.woff" ) format("woff"); b: url('cdn/b.png') }"#
    );
  }

  #[test]
  fn never_alters_absolute_protocol_relative_data_or_root_urls() {
    let css = "a{b:url(http://x/images/a.png)} c{d:url(//x/images/a.png)} \
               e{f:url(data:image/png;base64,images/)} g{h:url(/images/a.png)}";
    let mut calls = 0;
    let out = rewrite_css_urls(css, |url| {
      calls += 1;
      cdn(url)
    });
    assert_eq!(out, css);
    assert_eq!(calls, 0);
  }

  #[test]
  fn only_rewrites_inside_each_match() {
    let css = "/* images/a.png */ .x { background: url(images/a.png) } .y::after { content: \"images/a.png\" }";
    assert_eq!(
      rewrite_css_urls(css, cdn),
      "/* images/a.png */ .x { background: url(cdn/a.png) } .y::after { content: \"images/a.png\" }"
    );
  }

  #[test]
  fn keeps_order_of_multiple_urls() {
    let css = "a{x:url(one.png)}b{y:url(two.png)}c{z:url(three.png)}";
    let out = rewrite_css_urls(css, |url| format!("../{url}"));
    assert_eq!(out, "a{x:url(../one.png)}b{y:url(../two.png)}c{z:url(../three.png)}");
  }

  #[test]
  fn identical_resolution_keeps_original_token() {
    let css = "a { b: URL( img.png ) }";
    assert_eq!(rewrite_css_urls(css, |url| url.to_string()), css);
  }

  #[test]
  fn is_stable_for_idempotent_resolvers() {
    let css = "a{b:url(images/a.png)} c{d:url('cdn/b.png')}";
    let once = rewrite_css_urls(css, cdn);
    let twice = rewrite_css_urls(&once, cdn);
    assert_eq!(once, twice);
  }

  #[test]
  fn skips_empty_urls() {
    let css = "a { b: url() c: url('') }";
    assert_eq!(rewrite_css_urls(css, |_| "x".into()), css);
  }

  #[test]
  fn filter_hash_tracks_configuration() {
    let a = CssRewriteFilter::with_base("../media");
    let b = CssRewriteFilter::with_base("../assets");
    assert_ne!(a.hash(), b.hash());
    assert_eq!(a.apply("x{y:url(p.png)}"), "x{y:url(../media/p.png)}");
  }

  #[test]
  fn custom_resolver_is_used() {
    let filter = CssRewriteFilter::with_resolver("upper", |url| url.to_uppercase());
    assert_eq!(filter.apply("x{y:url(p.png)}"), "x{y:url(P.PNG)}");
    assert_eq!(filter.hash().as_deref(), Some("CssRewrite:upper"));
  }

  #[test]
  fn prefixes_with_trimmed_base() {
    assert_eq!(prefix_relative_url("../media/", "a.png"), "../media/a.png");
    assert_eq!(prefix_relative_url("", "a.png"), "a.png");
  }
}

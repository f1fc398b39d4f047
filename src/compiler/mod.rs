//! Compilation of asset definitions into final content.
//!
//! [`AssetCompiler`] is the seam to the bundling engine: it turns a definition into content
//! plus the metadata needed to derive a cache key. [`FsCompiler`] is the built-in engine; it
//! reads sources from disk, expands globs, follows references, concatenates collections and
//! runs filter chains. It does not minify or transpile anything itself.

mod glob;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::trace;

pub use glob::expand_glob;

use crate::cache_key::{CacheKeyParts, derive_cache_key};
use crate::error::{PipelineError, PipelineResult};
use crate::filters::FilterHandle;
use crate::models::{AssetDefinition, AssetName};
use crate::registry::AssetRegistry;

/// Output of compiling one asset definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledAsset {
  /// Final content with every filter applied. Fonts and media are kept as raw bytes.
  pub content: Vec<u8>,
  /// Directory the sources were read from, for single-source assets.
  pub source_root: Option<String>,
  /// Source path relative to `source_root`.
  pub source_path: Option<String>,
  /// Output path, when one has been assigned.
  pub target_path: Option<String>,
  /// Most recent modification time of any source, in seconds since the Unix epoch.
  pub last_modified: Option<u64>,
  /// Filters that were applied to the final content.
  pub filters: Vec<FilterHandle>,
  /// Additional values the content depends on.
  pub values: BTreeMap<String, String>,
}

impl CompiledAsset {
  /// Cache key inputs for this asset.
  pub fn key_parts(&self) -> CacheKeyParts<'_> {
    CacheKeyParts {
      source_root: self.source_root.as_deref(),
      source_path: self.source_path.as_deref(),
      target_path: self.target_path.as_deref(),
      last_modified: self.last_modified,
      filters: &self.filters,
      values: &self.values,
    }
  }

  /// Derive the cache key of this asset with `salt`.
  pub fn cache_key(&self, salt: &str) -> String {
    derive_cache_key(&self.key_parts(), salt)
  }
}

/// Bundling engine contract.
pub trait AssetCompiler: Send + Sync {
  /// Compile `definition`, resolving references through `registry`.
  fn compile(
    &self,
    definition: &AssetDefinition,
    registry: &AssetRegistry,
  ) -> PipelineResult<CompiledAsset>;
}

/// Filesystem-backed compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCompiler;

impl FsCompiler {
  /// Create the compiler.
  pub fn new() -> Self {
    Self
  }

  fn compile_inner(
    &self,
    definition: &AssetDefinition,
    registry: &AssetRegistry,
    visiting: &mut Vec<AssetName>,
  ) -> PipelineResult<CompiledAsset> {
    match definition {
      AssetDefinition::File { path, filters } => {
        let mut compiled = load_file(Path::new(path))?;
        apply_filters(&mut compiled, filters)?;
        Ok(compiled)
      }
      AssetDefinition::Glob { pattern, filters } => {
        let mut compiled = CompiledAsset::default();
        let mut parts = Vec::new();
        for file in expand_glob(pattern)? {
          let loaded = load_file(&file)?;
          compiled.last_modified = compiled.last_modified.max(loaded.last_modified);
          parts.push(loaded.content);
        }
        trace!("glob {pattern} matched {} files", parts.len());
        compiled.content = parts.join(&b'\n');
        compiled.source_path = Some(pattern.clone());
        apply_filters(&mut compiled, filters)?;
        Ok(compiled)
      }
      AssetDefinition::Collection { children, filters } => {
        let mut compiled = CompiledAsset::default();
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
          let child = self.compile_inner(child, registry, visiting)?;
          compiled.last_modified = compiled.last_modified.max(child.last_modified);
          compiled.values.extend(child.values);
          parts.push(child.content);
        }
        compiled.content = parts.join(&b'\n');
        apply_filters(&mut compiled, filters)?;
        Ok(compiled)
      }
      AssetDefinition::Reference { target } => {
        if visiting.contains(target) {
          return Err(PipelineError::ReferenceCycle {
            name: target.to_string(),
          });
        }
        let resolved = registry.get(target.as_str())?;
        visiting.push(target.clone());
        let compiled = self.compile_inner(resolved, registry, visiting);
        visiting.pop();
        compiled
      }
    }
  }
}

impl AssetCompiler for FsCompiler {
  fn compile(
    &self,
    definition: &AssetDefinition,
    registry: &AssetRegistry,
  ) -> PipelineResult<CompiledAsset> {
    self.compile_inner(definition, registry, &mut Vec::new())
  }
}

fn load_file(path: &Path) -> PipelineResult<CompiledAsset> {
  let content = fs::read(path).map_err(|err| PipelineError::io(path, err))?;
  let last_modified = fs::metadata(path)
    .and_then(|meta| meta.modified())
    .ok()
    .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
    .map(|elapsed| elapsed.as_secs());

  Ok(CompiledAsset {
    content,
    source_root: path
      .parent()
      .map(|parent| parent.to_string_lossy().into_owned()),
    source_path: path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned()),
    last_modified,
    ..CompiledAsset::default()
  })
}

/// Run `filters` over the content. Content is only decoded as UTF-8 when a filter is attached.
fn apply_filters(compiled: &mut CompiledAsset, filters: &[FilterHandle]) -> PipelineResult<()> {
  compiled.filters = filters.to_vec();
  if filters.is_empty() {
    return Ok(());
  }

  let mut text = String::from_utf8(std::mem::take(&mut compiled.content))
    .map_err(|source| PipelineError::NonUtf8Content { source })?;
  for handle in filters {
    text = handle.filter().apply(&text);
  }
  compiled.content = text.into_bytes();
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::bundle::styles::CssRewriteFilter;
  use crate::filters::Filter;
  use crate::filters::test_support::Suffix;
  use crate::models::AssetType;
  use crate::registry::format_name;
  use tempfile::tempdir;

  fn handle(name: &str, filter: impl Filter + 'static) -> FilterHandle {
    FilterHandle::new(format_name(name, AssetType::Style), Arc::new(filter))
  }

  fn file(path: &Path) -> AssetDefinition {
    AssetDefinition::File {
      path: path.to_string_lossy().into_owned(),
      filters: Vec::new(),
    }
  }

  #[test]
  fn compiles_file_with_metadata_and_filters() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("site.css");
    fs::write(&path, "a{b:url(img/x.png)}").unwrap();

    let definition = AssetDefinition::File {
      path: path.to_string_lossy().into_owned(),
      filters: vec![handle("rewrite", CssRewriteFilter::with_base("../media"))],
    };
    let compiled = FsCompiler::new()
      .compile(&definition, &AssetRegistry::new())
      .unwrap();

    assert_eq!(compiled.content, b"a{b:url(../media/img/x.png)}");
    assert_eq!(compiled.source_path.as_deref(), Some("site.css"));
    assert!(compiled.last_modified.is_some());
    assert_eq!(compiled.filters.len(), 1);
  }

  #[test]
  fn collection_concatenates_in_order_then_filters_once() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("icons")).unwrap();
    fs::write(dir.path().join("base.css"), "base").unwrap();
    fs::write(dir.path().join("extra.css"), "extra").unwrap();
    fs::write(dir.path().join("icons/b.css"), "icon-b").unwrap();
    fs::write(dir.path().join("icons/a.css"), "icon-a").unwrap();

    let mut registry = AssetRegistry::new();
    registry.register(
      format_name("base", AssetType::Style),
      AssetDefinition::File {
        path: dir.path().join("base.css").to_string_lossy().into_owned(),
        filters: vec![handle("ref", Suffix("[ref]"))],
      },
    );

    let collection = AssetDefinition::Collection {
      children: vec![
        AssetDefinition::Reference {
          target: format_name("base", AssetType::Style),
        },
        file(&dir.path().join("extra.css")),
        AssetDefinition::Glob {
          pattern: format!("{}/icons/*.css", dir.path().display()),
          filters: Vec::new(),
        },
      ],
      filters: vec![handle("end", Suffix("[end]"))],
    };

    let compiled = FsCompiler::new().compile(&collection, &registry).unwrap();
    assert_eq!(compiled.content, b"base[ref]\nextra\nicon-a\nicon-b[end]");
    assert_eq!(compiled.filters.len(), 1);
    assert!(compiled.source_path.is_none());
  }

  #[test]
  fn references_inherit_target_filters() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.css"), "a").unwrap();

    let mut registry = AssetRegistry::new();
    registry.register(
      format_name("a", AssetType::Style),
      AssetDefinition::File {
        path: dir.path().join("a.css").to_string_lossy().into_owned(),
        filters: vec![handle("mark", Suffix("!"))],
      },
    );
    let reference = AssetDefinition::Reference {
      target: format_name("a", AssetType::Style),
    };

    let compiled = FsCompiler::new().compile(&reference, &registry).unwrap();
    assert_eq!(compiled.content, b"a!");
    assert_eq!(compiled.filters[0].name().as_str(), "css_mark");
  }

  #[test]
  fn detects_reference_cycles() {
    let mut registry = AssetRegistry::new();
    registry.register(
      format_name("a", AssetType::Style),
      AssetDefinition::Reference {
        target: format_name("b", AssetType::Style),
      },
    );
    registry.register(
      format_name("b", AssetType::Style),
      AssetDefinition::Reference {
        target: format_name("a", AssetType::Style),
      },
    );

    let start = registry.get("css_a").unwrap().clone();
    let err = FsCompiler::new().compile(&start, &registry).unwrap_err();
    assert!(matches!(err, PipelineError::ReferenceCycle { .. }));
  }

  #[test]
  fn missing_reference_is_unknown_asset() {
    let reference = AssetDefinition::Reference {
      target: format_name("ghost", AssetType::Script),
    };
    let err = FsCompiler::new()
      .compile(&reference, &AssetRegistry::new())
      .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownAsset { name } if name == "js_ghost"));
  }

  #[test]
  fn missing_file_is_io_error() {
    let definition = AssetDefinition::File {
      path: "/definitely/not/here.js".into(),
      filters: Vec::new(),
    };
    let err = FsCompiler::new()
      .compile(&definition, &AssetRegistry::new())
      .unwrap_err();
    assert!(matches!(err, PipelineError::Io { .. }));
  }

  #[test]
  fn binary_files_pass_through_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inter.woff2");
    let bytes = [0x77, 0x4f, 0x46, 0x32, 0xff, 0xfe, 0x00, 0x80];
    fs::write(&path, bytes).unwrap();

    let compiled = FsCompiler::new()
      .compile(&file(&path), &AssetRegistry::new())
      .unwrap();
    assert_eq!(compiled.content, bytes);
  }

  #[test]
  fn filters_on_binary_content_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logo.png");
    fs::write(&path, [0x89, 0x50, 0xff, 0xfe]).unwrap();

    let definition = AssetDefinition::File {
      path: path.to_string_lossy().into_owned(),
      filters: vec![handle("mark", Suffix("!"))],
    };
    let err = FsCompiler::new()
      .compile(&definition, &AssetRegistry::new())
      .unwrap_err();
    assert!(matches!(err, PipelineError::NonUtf8Content { .. }));
  }

  #[test]
  fn globs_in_one_directory_key_differently() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.css"), "a").unwrap();
    fs::write(dir.path().join("b.css"), "b").unwrap();
    let glob = |name: &str| AssetDefinition::Glob {
      pattern: format!("{}/{name}", dir.path().display()),
      filters: Vec::new(),
    };

    let registry = AssetRegistry::new();
    let mut first = FsCompiler::new().compile(&glob("a*.css"), &registry).unwrap();
    let mut second = FsCompiler::new().compile(&glob("b*.css"), &registry).unwrap();
    first.last_modified = Some(1_700_000_000);
    second.last_modified = Some(1_700_000_000);
    assert_ne!(first.cache_key("dump"), second.cache_key("dump"));
  }

  #[test]
  fn cache_key_follows_content_metadata() {
    let compiled = CompiledAsset {
      content: "x".into(),
      source_root: Some("/a".into()),
      source_path: Some("b.css".into()),
      last_modified: Some(1),
      ..CompiledAsset::default()
    };
    let touched = CompiledAsset {
      last_modified: Some(2),
      ..compiled.clone()
    };
    assert_eq!(compiled.cache_key("dump"), compiled.clone().cache_key("dump"));
    assert_ne!(compiled.cache_key("dump"), touched.cache_key("dump"));
  }
}

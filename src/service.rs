//! Resolution of asset names to public URLs.

use tracing::{debug, warn};

use crate::asset_paths::make_target_path;
use crate::bundle::writer::AssetWriter;
use crate::cache_key::{DUMP_SALT, name_digest};
use crate::compiler::{AssetCompiler, CompiledAsset, FsCompiler};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::manager::AssetManager;
use crate::models::{AssetType, type_tag_of};
use crate::project::AssetLayout;
use crate::store::{CompiledCache, DirCompiledCache, MemoryUrlCache, UrlCache};

/// Turns registered asset names into URLs, compiling and writing output on demand.
///
/// Every call is synchronous: a miss compiles and writes before returning. The service is
/// `Send + Sync` and can be shared across threads once registration is done. Output names are
/// derived from content state (with a compiled cache) or from the asset name (without one),
/// so concurrent misses for the same name write identical files.
pub struct AssetService {
  layout: AssetLayout,
  manager: AssetManager,
  compiler: Box<dyn AssetCompiler>,
  writer: AssetWriter,
  url_cache: Option<Box<dyn UrlCache>>,
  compiled_cache: Option<Box<dyn CompiledCache>>,
}

impl AssetService {
  /// Service using the filesystem compiler and no caches.
  pub fn new(manager: AssetManager) -> Self {
    let layout = manager.layout().clone();
    Self {
      writer: AssetWriter::new(&layout.asset_dir),
      layout,
      manager,
      compiler: Box::new(FsCompiler::new()),
      url_cache: None,
      compiled_cache: None,
    }
  }

  /// Build the manager and caches described by `config`.
  pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
    let mut service = Self::new(AssetManager::from_config(config)?);
    if config.url_cache {
      service = service.with_url_cache(MemoryUrlCache::new());
    }
    if let Some(dir) = config.compiled_cache_path() {
      service = service.with_compiled_cache(DirCompiledCache::new(dir));
    }
    Ok(service)
  }

  /// Replace the compiler.
  pub fn with_compiler(mut self, compiler: impl AssetCompiler + 'static) -> Self {
    self.compiler = Box::new(compiler);
    self
  }

  /// Memoize resolved URLs in `cache`.
  pub fn with_url_cache(mut self, cache: impl UrlCache + 'static) -> Self {
    self.url_cache = Some(Box::new(cache));
    self
  }

  /// Name outputs by cache key and keep compiled content in `cache`.
  pub fn with_compiled_cache(mut self, cache: impl CompiledCache + 'static) -> Self {
    self.compiled_cache = Some(Box::new(cache));
    self
  }

  /// Registration state the service resolves against.
  pub fn manager(&self) -> &AssetManager {
    &self.manager
  }

  /// Resolve `name` to a URL, or an empty string when resolution fails.
  ///
  /// Failures are logged rather than returned so that a missing asset never aborts page
  /// rendering. Use [`AssetService::try_url`] to observe the error.
  pub fn get_url(&self, name: &str) -> String {
    self.try_url(name).unwrap_or_else(|err| {
      warn!("failed to resolve asset {name}: {err}");
      String::new()
    })
  }

  /// Resolve `name` to a URL.
  ///
  /// The asset type is read from the text before the first underscore of `name`.
  pub fn try_url(&self, name: &str) -> PipelineResult<String> {
    if let Some(cache) = &self.url_cache
      && let Some(url) = cache.get(name)
    {
      debug!("url cache hit for {name}");
      return Ok(url);
    }

    let (asset_type, compiled) = self.compile(name)?;

    let file_name = match &self.compiled_cache {
      Some(cache) => {
        let key = compiled.cache_key(DUMP_SALT);
        let content = match cache.get(&key)? {
          Some(content) => {
            debug!("compiled cache hit for {name} ({key})");
            content
          }
          None => {
            cache.set(&key, &compiled.content)?;
            compiled.content
          }
        };

        let file_name = format!("{key}.{}", asset_type.tag());
        let target_path = make_target_path(asset_type, &file_name);
        if !self.writer.exists(&target_path) {
          self.writer.write(&target_path, &content)?;
        }
        file_name
      }
      None => {
        let file_name = format!("{}.{}", name_digest(name), asset_type.tag());
        let target_path = make_target_path(asset_type, &file_name);
        self.writer.write(&target_path, &compiled.content)?;
        file_name
      }
    };

    let url = self.layout.asset_url_for(asset_type, &file_name);
    if let Some(cache) = &self.url_cache {
      cache.set(name, &url);
    }
    debug!("resolved {name} to {url}");
    Ok(url)
  }

  /// Cache key the compiled output of `name` is stored under.
  pub fn cache_key(&self, name: &str) -> PipelineResult<String> {
    let (_, compiled) = self.compile(name)?;
    Ok(compiled.cache_key(DUMP_SALT))
  }

  /// Compile `name`, tagging the result with the asset name as its target.
  ///
  /// Collections and globs have no single source file, so the name is what keeps two of them
  /// with identical timestamps and filters from sharing a key.
  fn compile(&self, name: &str) -> PipelineResult<(AssetType, CompiledAsset)> {
    let asset_type: AssetType = type_tag_of(name).parse().map_err(|_| PipelineError::UnknownAsset {
      name: name.to_string(),
    })?;
    let registry = self.manager.registry();
    let definition = registry.get(name)?;
    let mut compiled = self.compiler.compile(definition, registry)?;
    compiled.target_path = Some(name.to_string());
    Ok((asset_type, compiled))
  }
}

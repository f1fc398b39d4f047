//! Key/value stores consumed by the resolution service.
//!
//! The service only relies on the `get`/`set` contracts below. Stores are `Send + Sync` so a
//! resolved service can be shared between request threads. In-memory stores are provided for
//! tests and single-process use; [`DirCompiledCache`] keeps compiled output on disk so it
//! survives restarts.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{PipelineError, PipelineResult};

/// Memoized asset name to URL mapping.
pub trait UrlCache: Send + Sync {
  /// URL previously stored for `name`.
  fn get(&self, name: &str) -> Option<String>;

  /// Remember `url` for `name`.
  fn set(&self, name: &str, url: &str);
}

/// Compiled asset content keyed by cache key.
pub trait CompiledCache: Send + Sync {
  /// Content stored under `key`, if any.
  fn get(&self, key: &str) -> PipelineResult<Option<Vec<u8>>>;

  /// Store `content` under `key`.
  fn set(&self, key: &str, content: &[u8]) -> PipelineResult<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory [`UrlCache`].
#[derive(Debug, Default)]
pub struct MemoryUrlCache {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryUrlCache {
  /// Create an empty cache.
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of memoized URLs.
  pub fn len(&self) -> usize {
    lock(&self.entries).len()
  }

  /// Whether nothing has been memoized.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl UrlCache for MemoryUrlCache {
  fn get(&self, name: &str) -> Option<String> {
    lock(&self.entries).get(name).cloned()
  }

  fn set(&self, name: &str, url: &str) {
    lock(&self.entries).insert(name.to_string(), url.to_string());
  }
}

/// In-memory [`CompiledCache`].
#[derive(Debug, Default)]
pub struct MemoryCompiledCache {
  entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCompiledCache {
  /// Create an empty cache.
  pub fn new() -> Self {
    Self::default()
  }
}

impl CompiledCache for MemoryCompiledCache {
  fn get(&self, key: &str) -> PipelineResult<Option<Vec<u8>>> {
    Ok(lock(&self.entries).get(key).cloned())
  }

  fn set(&self, key: &str, content: &[u8]) -> PipelineResult<()> {
    lock(&self.entries).insert(key.to_string(), content.to_vec());
    Ok(())
  }
}

/// [`CompiledCache`] storing one file per key below a directory.
#[derive(Debug, Clone)]
pub struct DirCompiledCache {
  root: PathBuf,
}

impl DirCompiledCache {
  /// Cache rooted at `root`; the directory is created on first write.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Directory holding the cached entries.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn entry_path(&self, key: &str) -> PathBuf {
    self.root.join(key)
  }
}

impl CompiledCache for DirCompiledCache {
  fn get(&self, key: &str) -> PipelineResult<Option<Vec<u8>>> {
    let path = self.entry_path(key);
    match fs::read(&path) {
      Ok(content) => Ok(Some(content)),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
      Err(err) => Err(PipelineError::io(path, err)),
    }
  }

  fn set(&self, key: &str, content: &[u8]) -> PipelineResult<()> {
    fs::create_dir_all(&self.root).map_err(|err| PipelineError::io(&self.root, err))?;
    let path = self.entry_path(key);
    fs::write(&path, content).map_err(|err| PipelineError::io(path, err))
  }
}

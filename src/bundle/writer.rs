//! Persists compiled asset content below the public asset directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Writes compiled assets to `{root}/{target_path}`.
#[derive(Debug, Clone)]
pub struct AssetWriter {
  root: PathBuf,
}

impl AssetWriter {
  /// Create a writer rooted at the public asset directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Root directory the writer targets.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Absolute destination for a bundle-relative target path.
  pub fn destination(&self, target_path: &str) -> PathBuf {
    self.root.join(target_path)
  }

  /// Whether a file already exists for `target_path`.
  pub fn exists(&self, target_path: &str) -> bool {
    self.destination(target_path).is_file()
  }

  /// Write `content`, creating parent directories as needed. Existing files are replaced.
  pub fn write(&self, target_path: &str, content: &[u8]) -> PipelineResult<PathBuf> {
    let destination = self.destination(target_path);
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))?;
    }

    fs::write(&destination, content).map_err(|err| PipelineError::io(&destination, err))?;
    debug!("wrote {} bytes to {}", content.len(), destination.display());
    Ok(destination)
  }
}

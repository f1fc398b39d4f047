//! Error type shared by registration, compilation and URL resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by the asset pipeline front-end.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// A filter identifier could not be resolved to a filter factory.
  #[error("could not find filter `{identifier}`")]
  UnknownFilter {
    /// Identifier that was requested.
    identifier: String,
  },
  /// No asset definition is registered under the requested name.
  #[error("there is no asset registered as `{name}`")]
  UnknownAsset {
    /// Fully formatted asset name.
    name: String,
  },
  /// An asset type tag did not match any known type.
  #[error("unknown asset type `{tag}`")]
  UnknownAssetType {
    /// Tag that failed to parse.
    tag: String,
  },
  /// Following references led back to an asset that was already being compiled.
  #[error("asset reference cycle detected at `{name}`")]
  ReferenceCycle {
    /// Name of the asset that closed the cycle.
    name: String,
  },
  /// A glob pattern could not be turned into a matcher.
  #[error("invalid glob pattern `{pattern}`")]
  InvalidGlob {
    /// Offending pattern.
    pattern: String,
    /// Underlying glob parse error.
    source: globset::Error,
  },
  /// Text filters were attached to content that is not valid UTF-8.
  #[error("cannot apply filters to non UTF-8 content")]
  NonUtf8Content {
    /// Underlying decode error.
    source: std::string::FromUtf8Error,
  },
  /// File system failure while reading sources or writing output.
  #[error("i/o error at {}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse a JSON configuration file.
  #[error("failed to parse configuration at {}", path.display())]
  Config {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl PipelineError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

//! Glob expansion for glob assets and glob tokens inside collections.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::{DirEntry, WalkDir};

use crate::error::{PipelineError, PipelineResult};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Split `pattern` into the literal directory to walk and the glob relative to it.
///
/// Segments up to the first one holding a wildcard form the directory. A pattern without any
/// wildcard keeps its last segment as the glob so it matches that single file.
fn split_pattern(pattern: &str) -> (PathBuf, String) {
  let segments: Vec<&str> = pattern.split('/').collect();
  let first_glob = segments
    .iter()
    .position(|segment| segment.contains(GLOB_META))
    .unwrap_or(segments.len() - 1);

  let literal = segments[..first_glob].join("/");
  let base = if literal.is_empty() && pattern.starts_with('/') {
    PathBuf::from("/")
  } else if literal.is_empty() {
    PathBuf::from(".")
  } else {
    PathBuf::from(literal)
  };
  (base, segments[first_glob..].join("/"))
}

fn matcher(pattern: &str, relative: &str) -> PipelineResult<GlobMatcher> {
  GlobBuilder::new(relative)
    .literal_separator(true)
    .build()
    .map(|glob| glob.compile_matcher())
    .map_err(|source| PipelineError::InvalidGlob {
      pattern: pattern.to_string(),
      source,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Expand `pattern` into the sorted list of matching files.
///
/// `*` and `?` stay within one path segment, `**` crosses directories, and `[...]` / `{a,b}`
/// work as in shell globs. Hidden files and directories are skipped. A missing base directory
/// expands to nothing.
pub fn expand_glob(pattern: &str) -> PipelineResult<Vec<PathBuf>> {
  let (base, relative) = split_pattern(pattern);
  let matcher = matcher(pattern, &relative)?;

  if !base.is_dir() {
    return Ok(Vec::new());
  }

  let mut walker = WalkDir::new(&base).min_depth(1).sort_by_file_name();
  if !relative.contains("**") {
    walker = walker.max_depth(relative.split('/').count());
  }

  let mut matches = Vec::new();
  for entry in walker.into_iter().filter_entry(|entry| !is_hidden(entry)) {
    let entry = entry.map_err(|err| {
      let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| base.clone());
      PipelineError::io(path, err.into())
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let Ok(relative_path) = entry.path().strip_prefix(&base) else {
      continue;
    };
    if matcher.is_match(relative_path) {
      matches.push(entry.into_path());
    }
  }

  matches.sort();
  Ok(matches)
}

//! Helpers for resolving and classifying asset paths and URLs.
//!
//! The responsibilities are split into focused submodules so that resolving source paths,
//! classifying collection tokens, deciding which stylesheet URLs to leave alone, and building
//! bundle-relative target paths can be tested independently.

mod bundle;
mod filters;
mod resolve;
mod tokens;

pub use bundle::make_target_path;
pub use filters::should_skip_url_rewrite;
pub use resolve::resolve_resource_path;
pub use tokens::{ResourceToken, classify_resource};

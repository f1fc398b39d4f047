#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod asset_paths;
pub mod bundle;
pub mod cache_key;
pub mod compiler;
pub mod config;
pub mod error;
pub mod filters;
pub mod manager;
pub mod models;
pub mod project;
pub mod registry;
pub mod service;
pub mod store;
pub mod view;

pub use bundle::styles::{CSS_REWRITE_FILTER, CssRewriteFilter, rewrite_css_urls};
pub use cache_key::{DUMP_SALT, derive_cache_key, name_digest};
pub use compiler::{AssetCompiler, CompiledAsset, FsCompiler};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use filters::{Filter, FilterRegistry};
pub use manager::AssetManager;
pub use models::{AssetDefinition, AssetName, AssetType};
pub use project::AssetLayout;
pub use registry::{AssetRegistry, format_name};
pub use service::AssetService;
pub use view::AssetsHelper;

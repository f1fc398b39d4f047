//! Registration API tying names, source paths and filter chains together.

use tracing::debug;

use crate::asset_paths::{ResourceToken, classify_resource};
use crate::config::{AssetDeclaration, FilterDeclaration, PipelineConfig};
use crate::error::PipelineResult;
use crate::filters::{FilterManager, FilterRegistry, FilterSpec};
use crate::models::{AssetDefinition, AssetName, AssetType};
use crate::project::AssetLayout;
use crate::registry::{AssetRegistry, format_name};

/// Owns the asset registry and the filters attached to each asset type.
///
/// Registration is expected to happen once at startup; afterwards the manager is handed to
/// [`crate::service::AssetService`] for resolution.
#[derive(Debug)]
pub struct AssetManager {
  layout: AssetLayout,
  registry: AssetRegistry,
  filters: FilterManager,
  filter_registry: FilterRegistry,
}

impl AssetManager {
  /// Create a manager with an empty registry.
  pub fn new(layout: AssetLayout, filter_registry: FilterRegistry) -> Self {
    Self {
      layout,
      registry: AssetRegistry::new(),
      filters: FilterManager::new(),
      filter_registry,
    }
  }

  /// Build a manager from configuration, registering its filters and then its assets.
  pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
    let mut manager = Self::new(
      config.to_layout(),
      FilterRegistry::with_defaults(&config.css_rewrite_base),
    );
    manager.apply_declarations(&config.filters, &config.assets)?;
    Ok(manager)
  }

  /// Register declared filters followed by declared assets, in order.
  pub fn apply_declarations(
    &mut self,
    filters: &[FilterDeclaration],
    assets: &[AssetDeclaration],
  ) -> PipelineResult<()> {
    for declaration in filters {
      self.add_filter(
        &declaration.name,
        declaration.filter.as_str(),
        declaration.asset_type,
      )?;
    }

    for declaration in assets {
      match declaration {
        AssetDeclaration::File {
          asset_type,
          name,
          path,
        } => {
          self.add_file(*asset_type, name, path);
        }
        AssetDeclaration::Glob {
          asset_type,
          name,
          pattern,
        } => {
          self.add_glob(*asset_type, name, pattern);
        }
        AssetDeclaration::Collection {
          asset_type,
          name,
          resources,
        } => {
          self.add_collection(*asset_type, name, resources.as_slice());
        }
        AssetDeclaration::Reference {
          asset_type,
          name,
          target,
        } => {
          self.add_reference(*asset_type, name, target);
        }
      }
    }

    Ok(())
  }

  /// Register a filter for `asset_type` and append it to that type's chain.
  ///
  /// String identifiers are resolved through the filter registry and fail with
  /// [`crate::PipelineError::UnknownFilter`] when no factory exists. Only assets registered
  /// afterwards pick the filter up.
  pub fn add_filter(
    &mut self,
    name: &str,
    filter: impl Into<FilterSpec>,
    asset_type: AssetType,
  ) -> PipelineResult<()> {
    let instance = match filter.into() {
      FilterSpec::Identifier(identifier) => self.filter_registry.create(&identifier)?,
      FilterSpec::Instance(instance) => instance,
    };
    let name = format_name(name, asset_type);
    debug!("registered filter {name} ({})", instance.identifier());
    self.filters.set(asset_type, name, instance);
    Ok(())
  }

  /// Register a single file asset.
  pub fn add_file(&mut self, asset_type: AssetType, name: &str, file: &str) -> &AssetDefinition {
    let definition = AssetDefinition::File {
      path: self.layout.resource_path(asset_type, file),
      filters: self.filters.chain(asset_type).to_vec(),
    };
    self.register(format_name(name, asset_type), definition)
  }

  /// Register a glob asset; the pattern is expanded when the asset is compiled.
  pub fn add_glob(&mut self, asset_type: AssetType, name: &str, pattern: &str) -> &AssetDefinition {
    let definition = AssetDefinition::Glob {
      pattern: self.layout.resource_path(asset_type, pattern),
      filters: self.filters.chain(asset_type).to_vec(),
    };
    self.register(format_name(name, asset_type), definition)
  }

  /// Register a collection built from resource tokens.
  ///
  /// `@name` tokens become references to assets of the same type, tokens containing `*`
  /// become globs and anything else a file. Children carry no filters of their own; the
  /// type's chain is applied once to the concatenated collection.
  pub fn add_collection<S: AsRef<str>>(
    &mut self,
    asset_type: AssetType,
    name: &str,
    resources: &[S],
  ) -> &AssetDefinition {
    let children = resources
      .iter()
      .map(|resource| match classify_resource(resource.as_ref()) {
        ResourceToken::Reference(token) => AssetDefinition::Reference {
          target: format_name(token, asset_type),
        },
        ResourceToken::Glob(token) => AssetDefinition::Glob {
          pattern: self.layout.resource_path(asset_type, token),
          filters: Vec::new(),
        },
        ResourceToken::File(token) => AssetDefinition::File {
          path: self.layout.resource_path(asset_type, token),
          filters: Vec::new(),
        },
      })
      .collect();

    let definition = AssetDefinition::Collection {
      children,
      filters: self.filters.chain(asset_type).to_vec(),
    };
    self.register(format_name(name, asset_type), definition)
  }

  /// Register `name` as a reference to the `target` asset of the same type.
  pub fn add_reference(&mut self, asset_type: AssetType, name: &str, target: &str) -> &AssetDefinition {
    let definition = AssetDefinition::Reference {
      target: format_name(target, asset_type),
    };
    self.register(format_name(name, asset_type), definition)
  }

  /// Store a definition under an already formatted name. Last registration wins.
  pub fn register(&mut self, name: AssetName, definition: AssetDefinition) -> &AssetDefinition {
    debug!("registered {} asset {name}", definition.kind());
    self.registry.register(name, definition)
  }

  /// Registered definitions.
  pub fn registry(&self) -> &AssetRegistry {
    &self.registry
  }

  /// Filters recorded per type.
  pub fn filters(&self) -> &FilterManager {
    &self.filters
  }

  /// Layout used to resolve source paths.
  pub fn layout(&self) -> &AssetLayout {
    &self.layout
  }
}

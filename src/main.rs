//! Command-line front-end for resolving asset URLs and rewriting stylesheets.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_frontend::bundle::styles::prefix_relative_url;
use asset_frontend::config::DEFAULT_CONFIG_FILE;
use asset_frontend::{AssetService, PipelineConfig, rewrite_css_urls};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asset-frontend")]
#[command(about = "Resolve named assets to URLs and rewrite stylesheet references", long_about = None)]
#[command(version)]
struct Cli {
  /// Path to the pipeline configuration (defaults to ./asset_frontend.config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the public URL of each named asset, compiling it when needed
  Url {
    /// Fully formatted asset names (e.g. css_site)
    #[arg(required = true)]
    names: Vec<String>,
  },

  /// Rewrite relative url() references of a stylesheet and print the result
  Rewrite {
    /// Stylesheet to rewrite
    file: PathBuf,

    /// Prefix joined onto every relative URL
    #[arg(long, default_value = "")]
    base: String,
  },

  /// Print the cache key of a registered asset
  Key {
    /// Fully formatted asset name
    name: String,
  },
}

fn main() -> Result<()> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();

  let cli = Cli::parse();
  match cli.command {
    Commands::Url { names } => {
      let service = load_service(cli.config)?;
      for name in names {
        let url = service
          .try_url(&name)
          .with_context(|| format!("failed to resolve {name}"))?;
        println!("{url}");
      }
    }
    Commands::Rewrite { file, base } => {
      let css = fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
      print!("{}", rewrite_css_urls(&css, |url| prefix_relative_url(&base, url)));
    }
    Commands::Key { name } => {
      let service = load_service(cli.config)?;
      let key = service
        .cache_key(&name)
        .with_context(|| format!("failed to compile {name}"))?;
      println!("{key}");
    }
  }

  Ok(())
}

fn load_service(config: Option<PathBuf>) -> Result<AssetService> {
  let config = match config {
    Some(path) => PipelineConfig::from_path(&path)
      .with_context(|| format!("failed to load {}", path.display()))?,
    None => {
      let cwd = std::env::current_dir().context("failed to read the working directory")?;
      tracing::debug!("looking for {DEFAULT_CONFIG_FILE} in {}", cwd.display());
      PipelineConfig::discover(&cwd)
    }
  };
  AssetService::from_config(&config).context("failed to register configured assets")
}

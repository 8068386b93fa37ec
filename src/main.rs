use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lowdefy_build::{BuildConfig, BuildPipeline};

/// Lowdefy - build apps from YAML configuration
#[derive(Parser)]
#[command(name = "lowdefy")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Directory containing lowdefy.yaml
  #[arg(
    long,
    global = true,
    env = "LOWDEFY_CONFIG_DIRECTORY",
    default_value = "."
  )]
  config_directory: PathBuf,

  /// Where build artifacts are written (default: <config-directory>/.lowdefy/build)
  #[arg(long, global = true, env = "LOWDEFY_BUILD_DIRECTORY")]
  build_directory: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile the config and write the build artifact
  Build,

  /// Compile the config without writing anything and print the ref graph
  Check,
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env("LOWDEFY_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let mut config = BuildConfig::new(&cli.config_directory);
  if let Some(build_directory) = cli.build_directory {
    config = config.with_build_directory(build_directory);
  }
  let config = config
    .load_types_map()
    .await
    .context("failed to load types map")?;

  match cli.command {
    Some(Commands::Build) => build(&config).await?,
    Some(Commands::Check) => check(&config).await?,
    None => {
      println!("lowdefy - use --help to see available commands");
    }
  }

  Ok(())
}

async fn build(config: &BuildConfig) -> Result<()> {
  let artifact = BuildPipeline::from_config(config)
    .run()
    .await
    .with_context(|| format!("build failed for {}", config.config_directory.display()))?;

  eprintln!(
    "Built {} pages and {} connections into {}",
    artifact.pages.len(),
    artifact.connections.len(),
    config.build_directory.display()
  );
  Ok(())
}

async fn check(config: &BuildConfig) -> Result<()> {
  let compiled = BuildPipeline::from_config(config)
    .compile()
    .await
    .with_context(|| format!("check failed for {}", config.config_directory.display()))?;
  info!(entry = %compiled.entry, "config_valid");

  let graph: serde_json::Map<String, serde_json::Value> = compiled
    .graph
    .paths()
    .map(|path| {
      let entry = serde_json::json!({
        "references": compiled.graph.dependencies(path),
        "referencedBy": compiled.graph.dependents(path),
      });
      (path.to_string(), entry)
    })
    .collect();
  println!("{}", serde_json::to_string_pretty(&graph)?);
  Ok(())
}

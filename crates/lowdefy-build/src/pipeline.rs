use std::collections::BTreeSet;
use std::path::PathBuf;

use lowdefy_config::{AppConfig, BuildArtifact, PageList, TypesMap};
use lowdefy_refs::{DependencyGraph, DocumentLoader, FsLoader, RefResolver};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::connections::build_connections;
use crate::error::BuildError;
use crate::menus::build_menus;
use crate::pages::build_pages;
use crate::plugins::generate_plugin_files;
use crate::types::UsedTypes;
use crate::validate::validate_config;
use crate::writer::{ArtifactWriter, FsWriter};

const ENTRY_FILES: [&str; 2] = ["lowdefy.yaml", "lowdefy.yml"];

/// Where a build reads from and writes to.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  pub config_directory: PathBuf,
  pub build_directory: PathBuf,
  pub types_map: TypesMap,
}

impl BuildConfig {
  /// Build into `<config_directory>/.lowdefy/build` with the built-in types.
  pub fn new(config_directory: impl Into<PathBuf>) -> Self {
    let config_directory = config_directory.into();
    Self {
      build_directory: config_directory.join(".lowdefy").join("build"),
      config_directory,
      types_map: TypesMap::builtin(),
    }
  }

  pub fn with_build_directory(mut self, build_directory: impl Into<PathBuf>) -> Self {
    self.build_directory = build_directory.into();
    self
  }

  pub fn with_types_map(mut self, types_map: TypesMap) -> Self {
    self.types_map = types_map;
    self
  }

  /// Merge `<config_directory>/types.json` over the current types map, if
  /// the file exists.
  pub async fn load_types_map(mut self) -> Result<Self, BuildError> {
    let path = self.config_directory.join("types.json");
    let content = match tokio::fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(self),
      Err(e) => {
        return Err(BuildError::TypesMap {
          path: path.display().to_string(),
          message: e.to_string(),
        });
      }
    };
    let types: TypesMap = serde_json::from_str(&content).map_err(|e| BuildError::TypesMap {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    self.types_map.merge(types);
    Ok(self)
  }
}

/// The result of compiling a config without writing it.
#[derive(Debug, Clone)]
pub struct Compiled {
  pub artifact: BuildArtifact,
  /// The entry file the config was read from.
  pub entry: String,
  pub graph: DependencyGraph,
}

/// Resolves, validates and compiles an app config into a [`BuildArtifact`].
pub struct BuildPipeline<L: DocumentLoader, W: ArtifactWriter> {
  resolver: RefResolver<L>,
  writer: W,
  types_map: TypesMap,
}

impl BuildPipeline<FsLoader, FsWriter> {
  /// A pipeline reading from and writing to the directories in `config`.
  pub fn from_config(config: &BuildConfig) -> Self {
    Self::new(
      RefResolver::new(FsLoader::new(&config.config_directory)),
      FsWriter::new(&config.build_directory),
      config.types_map.clone(),
    )
  }
}

impl<L: DocumentLoader, W: ArtifactWriter> BuildPipeline<L, W> {
  pub fn new(resolver: RefResolver<L>, writer: W, types_map: TypesMap) -> Self {
    Self {
      resolver,
      writer,
      types_map,
    }
  }

  pub fn writer(&self) -> &W {
    &self.writer
  }

  /// Compile the config and write the artifact.
  #[instrument(skip(self))]
  pub async fn run(&self) -> Result<BuildArtifact, BuildError> {
    info!("build_started");
    let compiled = self.compile().await?;
    self.write(&compiled.artifact).await?;
    info!(
      entry = %compiled.entry,
      pages = compiled.artifact.pages.len(),
      documents = compiled.graph.len(),
      "build_completed"
    );
    Ok(compiled.artifact)
  }

  /// Resolve, validate and compile the config without writing anything.
  pub async fn compile(&self) -> Result<Compiled, BuildError> {
    let entry = self.find_entry().await?;
    let resolved = self.resolver.resolve(entry).await?;
    let components = resolved.value;

    match components.get("lowdefy") {
      None | Some(Value::Null) | Some(Value::String(_)) => {}
      Some(_) => {
        return Err(BuildError::configuration(
          "Version number specified in \"lowdefy.yaml\" file should be specified as a string.",
        ));
      }
    }

    let components = validate_config(components)?;
    let config = components.get("config").cloned().unwrap_or(Value::Null);
    let app: AppConfig = serde_json::from_value(config.clone())
      .map_err(|e| BuildError::configuration(format!("Invalid app config: {}.", e)))?;

    let mut used = UsedTypes::new();
    let connections = build_connections(&components, &mut used)?;
    let connection_ids: BTreeSet<String> = connections.iter().map(|c| c.id.clone()).collect();

    let pages = build_pages(&components, &connection_ids, &mut used)?;
    let page_ids: Vec<String> = pages
      .iter()
      .filter_map(|page| page.get("pageId").and_then(Value::as_str))
      .map(str::to_string)
      .collect();

    let menus = build_menus(&components, &page_ids)?;
    warn_unknown_auth_pages(&app, &page_ids);

    let plugins = used.resolve(&self.types_map)?;

    let artifact = BuildArtifact {
      auth: config.get("auth").cloned().unwrap_or(Value::Null),
      config,
      pages,
      menus: to_values(&menus, "menus.json")?,
      connections: to_values(&connections, "connections")?,
      plugins,
    };

    Ok(Compiled {
      artifact,
      entry: entry.to_string(),
      graph: resolved.graph,
    })
  }

  async fn find_entry(&self) -> Result<&'static str, BuildError> {
    for entry in ENTRY_FILES {
      let found = self
        .resolver
        .loader()
        .load(entry)
        .await
        .map_err(|source| lowdefy_refs::RefError::Load {
          path: entry.to_string(),
          source,
        })?;
      if found.is_some() {
        return Ok(entry);
      }
    }
    Err(BuildError::MissingEntry)
  }

  async fn write(&self, artifact: &BuildArtifact) -> Result<(), BuildError> {
    self.writer.clean().await?;

    self.write_json("config.json", &artifact.config).await?;
    self.write_json("menus.json", &artifact.menus).await?;
    self.write_json("auth.json", &artifact.auth).await?;
    for page in &artifact.pages {
      let id = page.get("pageId").and_then(Value::as_str).unwrap_or_default();
      self
        .write_json(&format!("pages/{id}/{id}.json"), page)
        .await?;
    }
    for connection in &artifact.connections {
      let id = connection.get("id").and_then(Value::as_str).unwrap_or_default();
      self
        .write_json(&format!("connections/{id}.json"), connection)
        .await?;
    }

    let theme = artifact.config.get("theme").cloned().unwrap_or(Value::Null);
    for file in generate_plugin_files(&artifact.plugins, &theme)? {
      self.writer.write(&file.path, &file.content).await?;
    }
    Ok(())
  }

  async fn write_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), BuildError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| BuildError::Serialize {
      path: path.to_string(),
      source,
    })?;
    self.writer.write(path, &content).await
  }
}

fn to_values<T: Serialize>(items: &[T], path: &str) -> Result<Vec<Value>, BuildError> {
  items
    .iter()
    .map(|item| {
      serde_json::to_value(item).map_err(|source| BuildError::Serialize {
        path: path.to_string(),
        source,
      })
    })
    .collect()
}

fn warn_unknown_auth_pages(app: &AppConfig, page_ids: &[String]) {
  let pages = &app.auth.pages;
  let listed = [&pages.protected, &pages.public]
    .into_iter()
    .flatten()
    .filter_map(|list| match list {
      PageList::Listed(ids) => Some(ids.iter()),
      PageList::All(_) => None,
    })
    .flatten()
    .chain(pages.roles.values().flatten());

  for id in listed {
    if !page_ids.contains(id) {
      warn!(page_id = %id, "auth_page_not_found");
    }
  }
}

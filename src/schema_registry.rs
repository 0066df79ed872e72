use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::schema::{Component, Model};

const MODEL_SUFFIX: &str = ".settings.json";

/// Registry of every model and component in a source project
pub struct SchemaRegistry {
    models: BTreeMap<String, Model>,
    components: BTreeMap<String, Component>,
    external_models: BTreeSet<String>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Component document {} has no `collectionName`", path.display())]
    MissingCollectionName { path: PathBuf },

    #[error("Duplicate model: {0}")]
    DuplicateModel(String),

    #[error("Duplicate component: {0}")]
    DuplicateComponent(String),
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
            components: BTreeMap::new(),
            external_models: BTreeSet::new(),
        }
    }

    /// Load a project tree.
    ///
    /// Models live at `api/<name>/models/*.settings.json` and are keyed by
    /// `<name>`; components live at `components/<group>/<name>.json` and are
    /// keyed by `<group>.<name>`.
    pub async fn load(root: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let root = root.as_ref();
        tokio::fs::metadata(root).await.map_err(|source| RegistryError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut registry = Self::new();

        for api_dir in list_dirs(&root.join("api")).await? {
            let Some(name) = file_name(&api_dir) else { continue };
            let models_dir = api_dir.join("models");
            if !is_dir(&models_dir).await {
                continue;
            }
            for path in list_files(&models_dir).await? {
                if !file_name(&path).is_some_and(|f| f.ends_with(MODEL_SUFFIX)) {
                    continue;
                }
                let text = read(&path).await?;
                let model = parse_model(&path, &text)?;
                debug!(model = %name, path = %path.display(), "loaded model");
                registry.add_model(name.clone(), model)?;
            }
        }

        for group_dir in list_dirs(&root.join("components")).await? {
            let Some(group) = file_name(&group_dir) else { continue };
            for path in list_files(&group_dir).await? {
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
                let key = format!("{group}.{stem}");
                let text = read(&path).await?;
                let component = parse_component(&path, &text)?;
                debug!(component = %key, path = %path.display(), "loaded component");
                registry.add_component(key, component)?;
            }
        }

        info!(
            models = registry.models.len(),
            components = registry.components.len(),
            root = %root.display(),
            "schema registry loaded"
        );
        Ok(registry)
    }

    /// Add a model under its name
    pub fn add_model(&mut self, name: impl Into<String>, model: Model) -> Result<(), RegistryError> {
        let name = name.into();
        if self.models.contains_key(&name) {
            return Err(RegistryError::DuplicateModel(name));
        }
        self.models.insert(name, model);
        Ok(())
    }

    /// Add a component under its `<group>.<name>` key
    pub fn add_component(&mut self, key: impl Into<String>, component: Component) -> Result<(), RegistryError> {
        let key = key.into();
        if self.components.contains_key(&key) {
            return Err(RegistryError::DuplicateComponent(key));
        }
        self.components.insert(key, component);
        Ok(())
    }

    /// Declare a relation target that is provided outside the project tree,
    /// e.g. a plugin's `user` model.
    pub fn declare_external_model(&mut self, name: impl Into<String>) {
        self.external_models.insert(name.into());
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn component(&self, key: &str) -> Option<&Component> {
        self.components.get(key)
    }

    /// Whether a relation may point at `name`
    pub fn resolves_model(&self, name: &str) -> bool {
        self.models.contains_key(name) || self.external_models.contains(name)
    }

    /// Relation targets declared outside the project tree, ordered by name
    pub fn external_models(&self) -> impl Iterator<Item = &str> {
        self.external_models.iter().map(String::as_str)
    }

    /// All models, ordered by name
    pub fn models(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a model document
pub fn parse_model(path: &Path, text: &str) -> Result<Model, RegistryError> {
    serde_json::from_str(text).map_err(|source| RegistryError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a component document, which must name its collection
pub fn parse_component(path: &Path, text: &str) -> Result<Component, RegistryError> {
    let load_error = |source| RegistryError::Load {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_json::from_str(text).map_err(load_error)?;

    if !value.get("collectionName").is_some_and(Value::is_string) {
        return Err(RegistryError::MissingCollectionName {
            path: path.to_path_buf(),
        });
    }

    serde_json::from_value(value).map_err(load_error)
}

async fn read(path: &Path) -> Result<String, RegistryError> {
    tokio::fs::read_to_string(path).await.map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Sorted subdirectories of `dir`; empty when `dir` does not exist.
async fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    if !is_dir(dir).await {
        warn!(path = %dir.display(), "directory not found, nothing to load");
        return Ok(Vec::new());
    }
    list_entries(dir, true).await
}

async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    list_entries(dir, false).await
}

async fn list_entries(dir: &Path, dirs: bool) -> Result<Vec<PathBuf>, RegistryError> {
    let io_error = |source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let file_type = entry.file_type().await.map_err(io_error)?;
        if file_type.is_dir() == dirs {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

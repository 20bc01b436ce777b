//! Project configuration (`resgen.yml` / `resgen.json`).

use indexmap::IndexMap;
use resgen_codegen::{CodegenOptions, ScaffoldLayout, ScaffoldOptions};
use resgen_core::Language;
use resgen_resolver::{ModelBinding, ModelReference};
use resgen_schema::ScalarMap;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File names searched, in order, when no configuration path is given.
pub const CONFIG_FILES: [&str; 3] = ["resgen.yml", "resgen.yaml", "resgen.json"];

/// Symbol used for a context reference without one.
const DEFAULT_CONTEXT_SYMBOL: &str = "Context";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration found in {} (looked for {})", dir.display(), CONFIG_FILES.join(", "))]
    NotFound { dir: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Resolver scaffolding file layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    #[default]
    FilePerType,
    Grouped,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScaffoldConfig {
    pub output: PathBuf,
    #[serde(default)]
    pub layout: LayoutKind,
    /// Group name to type names, for [`LayoutKind::Grouped`].
    #[serde(default)]
    pub groups: IndexMap<String, Vec<String>>,
}

/// The configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub language: Language,
    pub schema: PathBuf,
    /// `path:Symbol` of the context model.
    #[serde(default)]
    pub context: Option<String>,
    /// Schema type name to `path:Symbol`.
    #[serde(default)]
    pub models: IndexMap<String, String>,
    /// Files whose declarations bind same-named types implicitly.
    #[serde(default)]
    pub model_files: Vec<PathBuf>,
    /// Custom scalar to host type.
    #[serde(default)]
    pub scalars: IndexMap<String, String>,
    pub output: PathBuf,
    #[serde(default)]
    pub resolver_scaffolding: Option<ScaffoldConfig>,

    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Loads the configuration at `path`, or the first of [`CONFIG_FILES`]
    /// in the current directory.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        match path {
            Some(path) => Self::load(&cwd.join(path)),
            None => {
                let found = CONFIG_FILES
                    .iter()
                    .map(|name| cwd.join(name))
                    .find(|candidate| candidate.is_file())
                    .ok_or_else(|| ConfigError::NotFound { dir: cwd.clone() })?;
                Self::load(&found)
            }
        }
    }

    /// Loads a configuration file. `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::CurrentDir)?
                .join(path)
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config: Self = if is_json {
            serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                path: path.clone(),
                source,
            })?
        };

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config.with_base_dir(base_dir))
    }

    /// Makes every configured path absolute against `base_dir`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.schema = join(&base_dir, &self.schema);
        self.output = join(&base_dir, &self.output);
        for file in &mut self.model_files {
            *file = join(&base_dir, file);
        }
        if let Some(scaffold) = &mut self.resolver_scaffolding {
            scaffold.output = join(&base_dir, &scaffold.output);
        }
        self.base_dir = base_dir;
        self
    }

    /// Explicit model bindings, in configuration order.
    pub fn bindings(&self) -> Vec<ModelBinding> {
        self.models
            .iter()
            .map(|(type_name, raw)| ModelBinding::parse(type_name, raw))
            .collect()
    }

    pub fn context_reference(&self) -> Option<ModelReference> {
        self.context
            .as_deref()
            .map(|raw| ModelReference::parse(raw, DEFAULT_CONTEXT_SYMBOL))
    }

    pub fn scalar_map(&self) -> ScalarMap {
        self.scalars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    /// Code generation options. Scaffolding is included only if configured
    /// and `scaffold` is set.
    pub fn codegen_options(&self, scaffold: bool) -> CodegenOptions {
        let mut options = CodegenOptions::new(&self.output);
        options.language = self.language;

        match &self.resolver_scaffolding {
            Some(config) if scaffold => {
                let layout = match config.layout {
                    LayoutKind::FilePerType => {
                        if !config.groups.is_empty() {
                            tracing::warn!("scaffolding groups are ignored by the file-per-type layout");
                        }
                        ScaffoldLayout::FilePerType
                    }
                    LayoutKind::Grouped => ScaffoldLayout::Grouped(config.groups.clone()),
                };
                options.with_scaffold(ScaffoldOptions::new(&config.output).with_layout(layout))
            }
            _ => options,
        }
    }
}

/// Joins `path` onto `base`, dropping `.` components.
fn join(base: &Path, path: &Path) -> PathBuf {
    base.join(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

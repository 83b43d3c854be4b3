//! Pass configuration.

use crate::doc::Document;
use crate::error::Error;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Raw-content transform applied before parsing an imported file:
/// `(content, path) -> content`. Identity when absent.
pub type Prefilter = Arc<dyn Fn(String, &Path) -> String + Send + Sync>;

/// A host pipeline stage beyond the inliner itself.
pub type Plugin = Arc<dyn Fn(&mut Document) -> Result<(), Error> + Send + Sync>;

/// Options for one inlining pass. Supplied once, read-only while the pass
/// runs.
#[derive(Clone)]
pub struct Options {
    /// Base for relative labels, the alias base, and the fallback base
    /// directory when the importing file is unknown.
    pub root: PathBuf,
    /// Optional raw-content transform, applied before parsing.
    pub prefilter: Option<Prefilter>,
    /// Logical name -> path mapping (root-relative or absolute).
    pub alias: BTreeMap<String, String>,
    /// Package name -> entry file override, consulted before a package's
    /// own declared entry.
    pub shim: BTreeMap<String, String>,
    /// Whether nested parses run the host plugin list too, or only this
    /// stage.
    pub include_plugins: bool,
    /// Synthetic import targets injected before the first pass.
    pub prepend: Vec<String>,
    /// Host pipeline stages beyond this one.
    pub plugins: Vec<Plugin>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            prefilter: None,
            alias: BTreeMap::new(),
            shim: BTreeMap::new(),
            include_plugins: false,
            prepend: Vec::new(),
            plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("root", &self.root)
            .field("alias", &self.alias)
            .field("shim", &self.shim)
            .field("include_plugins", &self.include_plugins)
            .field("prepend", &self.prepend)
            .field("prefilter", &self.prefilter.is_some())
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

impl Options {
    /// Create options with the given root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Add an alias entry.
    #[must_use]
    pub fn with_alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.alias.insert(name.into(), target.into());
        self
    }

    /// Add a shim entry.
    #[must_use]
    pub fn with_shim(mut self, package: impl Into<String>, entry: impl Into<String>) -> Self {
        self.shim.insert(package.into(), entry.into());
        self
    }

    /// Set the prefilter.
    #[must_use]
    pub fn with_prefilter(mut self, prefilter: Prefilter) -> Self {
        self.prefilter = Some(prefilter);
        self
    }

    /// Append a prepend target.
    #[must_use]
    pub fn with_prepend(mut self, target: impl Into<String>) -> Self {
        self.prepend.push(target.into());
        self
    }

    /// Append a host plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Set whether nested parses run the host plugin list.
    #[must_use]
    pub fn with_include_plugins(mut self, include: bool) -> Self {
        self.include_plugins = include;
        self
    }

    /// Parse options from a JSON object (the CLI config file shape).
    ///
    /// `base` resolves a relative `root` and is the default root. Any
    /// field with the wrong shape is an [`Error::InvalidConfig`], raised
    /// synchronously at setup.
    pub fn from_json(value: &Value, base: &Path) -> Result<Self, Error> {
        let Some(object) = value.as_object() else {
            return Err(Error::invalid_config("expected a JSON object"));
        };

        let mut opts = Self::new(base);
        for (key, field) in object {
            match key.as_str() {
                "root" => {
                    let root = field.as_str().ok_or_else(|| {
                        Error::invalid_config("\"root\" must be a string")
                    })?;
                    opts.root = base.join(root);
                }
                "alias" => opts.alias = string_map(key, field)?,
                "shim" => opts.shim = string_map(key, field)?,
                "includePlugins" => {
                    opts.include_plugins = field.as_bool().ok_or_else(|| {
                        Error::invalid_config("\"includePlugins\" must be a boolean")
                    })?;
                }
                "prepend" => opts.prepend = string_list(key, field)?,
                other => {
                    return Err(Error::invalid_config(format!("unknown option \"{other}\"")));
                }
            }
        }
        Ok(opts)
    }
}

fn string_map(key: &str, value: &Value) -> Result<BTreeMap<String, String>, Error> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::invalid_config(format!("\"{key}\" must be an object of strings")))?;
    object
        .iter()
        .map(|(name, entry)| {
            entry
                .as_str()
                .map(|s| (name.clone(), s.to_string()))
                .ok_or_else(|| {
                    Error::invalid_config(format!("\"{key}\".\"{name}\" must be a string"))
                })
        })
        .collect()
}

fn string_list(key: &str, value: &Value) -> Result<Vec<String>, Error> {
    let list = value
        .as_array()
        .ok_or_else(|| Error::invalid_config(format!("\"{key}\" must be a sequence of strings")))?;
    list.iter()
        .map(|entry| {
            entry.as_str().map(String::from).ok_or_else(|| {
                Error::invalid_config(format!("\"{key}\" entries must be strings"))
            })
        })
        .collect()
}

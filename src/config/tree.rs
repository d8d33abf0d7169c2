//! The configuration tree
//!
//! `ConfigTree` owns the root table. It is built once from the defaults,
//! mutated by document merges and dotted-path overrides, then frozen and
//! shared read-only.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::defaults::default_table;
use super::document::load_document;
use super::dotted;
use super::error::ConfigError;
use super::merge::merge_override_into;
use super::value::{table_to_value, ConfigTable, ConfigValue, Number, ValueKind};

/// Hierarchical configuration with a fixed key set.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: ConfigTable,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// Defaults rooted at the directory of this crate
    pub fn new() -> Self {
        Self::with_root_dir(default_root_dir())
    }

    /// Defaults with `ROOT_DIR` set to `root_dir` and `DATA_DIR` below it
    pub fn with_root_dir(root_dir: impl AsRef<Path>) -> Self {
        Self {
            root: default_table(root_dir.as_ref()),
        }
    }

    pub fn root(&self) -> &ConfigTable {
        &self.root
    }

    /// Merge an override document, all or nothing.
    ///
    /// If any key fails, the tree is left exactly as it was.
    pub fn merge_document(&mut self, document: &Value) -> Result<(), ConfigError> {
        self.transaction(|root| merge_override_into(document, root))
    }

    /// Load an override file (YAML, TOML or JSON) and merge it.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let document = load_document(path)?;
        self.merge_document(&document.value)?;
        info!(path = %path.display(), digest = %document.digest, "Merged config file");
        Ok(())
    }

    /// Apply `[KEY, VALUE, ...]` overrides, all or nothing.
    pub fn set_by_dotted_path<S: AsRef<str>>(&mut self, pairs: &[S]) -> Result<(), ConfigError> {
        self.transaction(|root| dotted::set_by_dotted_path(pairs, root))
    }

    fn transaction<F>(&mut self, apply: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut ConfigTable) -> Result<(), ConfigError>,
    {
        let mut staged = self.root.clone();
        apply(&mut staged)?;
        self.root = staged;
        Ok(())
    }

    /// Freeze into a read-only snapshot that can be shared across threads
    pub fn freeze(self) -> Arc<ConfigTree> {
        Arc::new(self)
    }

    /// Get a node by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            ConfigValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        match self.get(path)? {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a tuple or list leaf
    pub fn get_numbers(&self, path: &str) -> Option<&[Number]> {
        self.get(path)?.as_numbers()
    }

    /// Like [`get`](Self::get), but an unknown path is an error
    pub fn require(&self, path: &str) -> Result<&ConfigValue, ConfigError> {
        self.get(path).ok_or_else(|| ConfigError::unknown_key(path))
    }

    pub fn require_f64(&self, path: &str) -> Result<f64, ConfigError> {
        match self.require(path)? {
            ConfigValue::Float(x) => Ok(*x),
            other => Err(ConfigError::type_mismatch(path, ValueKind::Float, other.kind())),
        }
    }

    pub fn require_i64(&self, path: &str) -> Result<i64, ConfigError> {
        match self.require(path)? {
            ConfigValue::Int(i) => Ok(*i),
            other => Err(ConfigError::type_mismatch(path, ValueKind::Int, other.kind())),
        }
    }

    pub fn require_bool(&self, path: &str) -> Result<bool, ConfigError> {
        match self.require(path)? {
            ConfigValue::Bool(b) => Ok(*b),
            other => Err(ConfigError::type_mismatch(path, ValueKind::Bool, other.kind())),
        }
    }

    pub fn require_str(&self, path: &str) -> Result<&str, ConfigError> {
        match self.require(path)? {
            ConfigValue::Text(s) => Ok(s),
            other => Err(ConfigError::type_mismatch(path, ValueKind::Str, other.kind())),
        }
    }

    /// Override-document form of the whole tree
    pub fn to_value(&self) -> Value {
        table_to_value(&self.root)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_value())
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_value())
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

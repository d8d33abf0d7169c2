//! Effective configuration with provenance
//!
//! Captures the final tree together with the ordered list of sources that
//! produced it: built-in defaults, override files, command-line pairs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

use super::document::load_document;
use super::error::ConfigError;
use super::tree::ConfigTree;

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "rcnn-config/effective_config@1";

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Dotted keys set from the command line (empty otherwise)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,

    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The final configuration tree
    pub config: ConfigTree,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Apply override files in order, then command-line pairs, on top of `base`.
    ///
    /// Fails on the first bad layer; nothing is returned for a partially
    /// applied configuration.
    pub fn build<P, S>(base: ConfigTree, files: &[P], cli_pairs: &[S]) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut config = base;
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
            keys: Vec::new(),
        }];

        for path in files {
            let path = path.as_ref();
            let document = load_document(path)?;
            config.merge_document(&document.value)?;
            info!(path = %path.display(), "Merged config file");
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(document.digest),
                keys: Vec::new(),
            });
        }

        if !cli_pairs.is_empty() {
            config.set_by_dotted_path(cli_pairs)?;
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
                keys: cli_pairs
                    .iter()
                    .step_by(2)
                    .map(|k| k.as_ref().to_string())
                    .collect(),
            });
        }

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            sources,
        })
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    pub fn into_config(self) -> ConfigTree {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::{Builder, TempDir};

    const NO_FILES: &[PathBuf] = &[];
    const NO_PAIRS: &[&str] = &[];

    fn base() -> ConfigTree {
        ConfigTree::with_root_dir("/srv/rcnn")
    }

    #[test]
    fn test_build_with_defaults_only() {
        let effective = EffectiveConfig::build(base(), NO_FILES, NO_PAIRS).unwrap();

        assert_eq!(effective.schema_version, SCHEMA_VERSION);
        assert_eq!(effective.sources.len(), 1);
        assert_eq!(effective.sources[0].origin, ConfigOrigin::Builtin);
        assert_eq!(effective.config, base());
    }

    #[test]
    fn test_file_then_cli_precedence() {
        let mut temp = Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(temp, "TRAIN:").unwrap();
        writeln!(temp, "  LEARNING_RATE: 0.01").unwrap();
        writeln!(temp, "  GAMMA: 0.2").unwrap();

        let effective = EffectiveConfig::build(
            base(),
            &[temp.path()],
            &["TRAIN.LEARNING_RATE", "0.005"],
        )
        .unwrap();

        assert_eq!(effective.config.get_f64("TRAIN.LEARNING_RATE"), Some(0.005));
        assert_eq!(effective.config.get_f64("TRAIN.GAMMA"), Some(0.2));

        let origins: Vec<_> = effective.sources.iter().map(|s| s.origin.clone()).collect();
        assert_eq!(
            origins,
            vec![ConfigOrigin::Builtin, ConfigOrigin::File, ConfigOrigin::Cli]
        );
        assert_eq!(effective.sources[1].digest.as_ref().map(|d| d.len()), Some(64));
        assert_eq!(effective.sources[2].keys, vec!["TRAIN.LEARNING_RATE".to_string()]);
    }

    #[test]
    fn test_bad_file_fails_build() {
        let mut temp = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(temp, "NOT_A_KEY = 1").unwrap();

        let result = EffectiveConfig::build(base(), &[temp.path()], NO_PAIRS);
        assert!(matches!(result, Err(ConfigError::UnknownKey { .. })));
    }

    #[test]
    fn test_yaml_keeps_provenance() {
        let effective = EffectiveConfig::build(base(), NO_FILES, &["EXP_DIR", "res50"]).unwrap();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&effective.to_yaml().unwrap()).unwrap();

        assert_eq!(yaml["schema_id"].as_str(), Some(SCHEMA_ID));
        assert_eq!(yaml["config"]["EXP_DIR"].as_str(), Some("res50"));
        assert_eq!(yaml["sources"][1]["origin"].as_str(), Some("cli"));
        assert_eq!(yaml["sources"][1]["keys"][0].as_str(), Some("EXP_DIR"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("effective_config.json");
        let effective = EffectiveConfig::build(base(), NO_FILES, &["RNG_SEED", "11"]).unwrap();
        effective.write_to_file(&out).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["schema_id"], SCHEMA_ID);
        assert_eq!(written["config"]["RNG_SEED"], 11);
        assert_eq!(written["sources"][1]["origin"], "cli");
    }
}

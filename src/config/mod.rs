//! Detection pipeline configuration
//!
//! A fixed-schema tree of defaults, overridden in layers:
//! 1. Built-in defaults
//! 2. Override files (YAML, TOML or JSON), merged in order
//! 3. Command-line `KEY VALUE` pairs

mod defaults;
mod document;
mod dotted;
mod effective;
mod error;
mod merge;
mod paths;
mod tree;
mod value;

pub use defaults::default_table;
pub use document::{load_document, parse_document, DocumentFormat, LoadedDocument};
pub use dotted::{set_by_dotted_path, ParsedOverride};
pub use effective::{ConfigOrigin, ConfigSource, EffectiveConfig, SCHEMA_ID, SCHEMA_VERSION};
pub use error::ConfigError;
pub use merge::merge_override_into;
pub use paths::{ArtifactNamespace, ImageDatabase, DEFAULT_WEIGHTS_DIR};
pub use tree::ConfigTree;
pub use value::{table_to_value, ConfigTable, ConfigValue, ElementType, NumArray, Number, ValueKind};

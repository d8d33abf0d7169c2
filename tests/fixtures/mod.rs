//! Test fixtures for override documents
//!
//! - `res101_kitti.yml`: YAML overrides touching every leaf kind
//! - `vgg16.toml`: TOML overrides, including an array leaf
//! - `bad_key.yml` / `bad_type.yml`: documents that must be rejected

use std::path::{Path, PathBuf};

/// Path to a fixture override document
pub fn config_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/configs")
        .join(name)
}

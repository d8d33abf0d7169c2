//! Experiment output directories
//!
//! Artifacts go to `<ROOT_DIR>/<namespace>/<EXP_DIR>/<imdb>/<weights>`,
//! where the namespace is `output` for checkpoints and detections and
//! `tensorboard` for summaries.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use super::tree::ConfigTree;

/// Weights directory used when no weights identifier is given
pub const DEFAULT_WEIGHTS_DIR: &str = "default";

/// Anything that names an image database.
pub trait ImageDatabase {
    fn name(&self) -> &str;
}

impl ImageDatabase for str {
    fn name(&self) -> &str {
        self
    }
}

impl ImageDatabase for String {
    fn name(&self) -> &str {
        self
    }
}

/// Top-level directory under `ROOT_DIR`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactNamespace {
    Output,
    Tensorboard,
}

impl ArtifactNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactNamespace::Output => "output",
            ArtifactNamespace::Tensorboard => "tensorboard",
        }
    }
}

impl ConfigTree {
    /// Directory for experiment artifacts, created if missing.
    pub fn output_dir<D>(&self, imdb: &D, weights: Option<&str>) -> io::Result<PathBuf>
    where
        D: ImageDatabase + ?Sized,
    {
        self.artifact_dir(ArtifactNamespace::Output, imdb, weights)
    }

    /// Directory for tensorboard summaries, created if missing.
    pub fn tensorboard_dir<D>(&self, imdb: &D, weights: Option<&str>) -> io::Result<PathBuf>
    where
        D: ImageDatabase + ?Sized,
    {
        self.artifact_dir(ArtifactNamespace::Tensorboard, imdb, weights)
    }

    /// Resolve and create `<ROOT_DIR>/<namespace>/<EXP_DIR>/<imdb>/<weights>`.
    ///
    /// Idempotent: an existing directory is returned as-is.
    pub fn artifact_dir<D>(
        &self,
        namespace: ArtifactNamespace,
        imdb: &D,
        weights: Option<&str>,
    ) -> io::Result<PathBuf>
    where
        D: ImageDatabase + ?Sized,
    {
        let root = self.path_setting("ROOT_DIR")?;
        let exp_dir = self.path_setting("EXP_DIR")?;

        let dir = absolute(Path::new(root))?
            .join(namespace.as_str())
            .join(exp_dir)
            .join(imdb.name())
            .join(weights.unwrap_or(DEFAULT_WEIGHTS_DIR));

        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
            info!(path = %dir.display(), "Created artifact directory");
        }
        Ok(dir)
    }

    fn path_setting(&self, key: &str) -> io::Result<&str> {
        self.require_str(key)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

//! Run configuration
//!
//! A run is rooted at a folder holding an `X_attrs.json` descriptor that names
//! the model subfolder. Clustering runs additionally read a hyperparameter file
//! of the form `{"hyper": {"n_clusters": N}}`. Intermediate folders live under
//! a separate working directory.

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ROOT_DESCRIPTOR: &str = "X_attrs.json";
pub const DEFAULT_MODEL_EXTENSION: &str = "json";

/// What the run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Cluster,
    Clone,
}

#[derive(Debug, Clone, Deserialize)]
struct RootDescriptor {
    xmi_folder: String,
}

#[derive(Debug, Clone, Deserialize)]
struct HyperFile {
    hyper: Hyper,
}

#[derive(Debug, Clone, Deserialize)]
struct Hyper {
    n_clusters: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub root: PathBuf,
    /// Folder holding the model files
    pub data_folder: PathBuf,
    pub feature_folder: PathBuf,
    pub vsm_folder: PathBuf,
    pub results_folder: PathBuf,
    pub goal: Goal,
    pub clusters: Option<usize>,
    /// Model file extension without the dot
    pub model_extension: String,
}

impl Configuration {
    /// Configuration with explicit folders and default intermediate layout under `work_dir`
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(data_folder: P, work_dir: Q, goal: Goal) -> Self {
        let work_dir = work_dir.as_ref();
        Self {
            root: work_dir.to_path_buf(),
            data_folder: data_folder.as_ref().to_path_buf(),
            feature_folder: work_dir.join("features"),
            vsm_folder: work_dir.join("vsm"),
            results_folder: work_dir.join("results"),
            goal,
            clusters: None,
            model_extension: DEFAULT_MODEL_EXTENSION.to_string(),
        }
    }

    /// Read `<root>/X_attrs.json` and, when given, the hyperparameter file
    pub fn load(root: &Path, hyper: Option<&Path>, work_dir: &Path, goal: Goal) -> Result<Self> {
        let descriptor: RootDescriptor = read_json(&root.join(ROOT_DESCRIPTOR))?;
        if descriptor.xmi_folder.trim().is_empty() {
            return Err(StorageError::InvalidConfig(format!(
                "{} has an empty xmi_folder",
                ROOT_DESCRIPTOR
            )));
        }

        let mut config = Self::new(root.join(&descriptor.xmi_folder), work_dir, goal);
        config.root = root.to_path_buf();
        if let Some(hyper) = hyper {
            config.clusters = Some(read_clusters(hyper)?);
        }
        debug!("loaded configuration {:?}", config);
        Ok(config)
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.model_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn with_clusters(mut self, clusters: usize) -> Self {
        self.clusters = Some(clusters);
        self
    }

    /// Create the intermediate folders
    pub fn prepare(&self) -> Result<()> {
        for folder in [&self.vsm_folder, &self.results_folder] {
            fs::create_dir_all(folder)?;
        }
        Ok(())
    }

    /// Empty the results folder so no back end output of an earlier run survives
    pub fn reset_results(&self) -> Result<()> {
        if self.results_folder.exists() {
            fs::remove_dir_all(&self.results_folder)?;
        }
        fs::create_dir_all(&self.results_folder)?;
        Ok(())
    }
}

/// `hyper.n_clusters` of a hyperparameter file
pub fn read_clusters(path: &Path) -> Result<usize> {
    let hyper: HyperFile = read_json(path)?;
    if hyper.hyper.n_clusters == 0 {
        return Err(StorageError::InvalidConfig(format!(
            "{:?}: n_clusters must be positive",
            path
        )));
    }
    Ok(hyper.hyper.n_clusters)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(StorageError::MissingInput(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

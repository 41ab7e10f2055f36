// Model loading: the seam between model files and typed graphs
use crate::error::{ExtractError, Result};
use samos_core::ModelGraph;
use std::fs;
use std::path::{Path, PathBuf};

pub trait ModelLoader: Send + Sync {
    /// File extension this loader reads, without the dot
    fn extension(&self) -> &str;

    fn load(&self, path: &Path) -> Result<ModelGraph>;
}

/// Loads JSON model graphs; a missing `name` defaults to the file stem
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelLoader;

impl ModelLoader for JsonModelLoader {
    fn extension(&self) -> &str {
        "json"
    }

    fn load(&self, path: &Path) -> Result<ModelGraph> {
        let text = fs::read_to_string(path)?;
        let mut graph = ModelGraph::from_json(&text).map_err(|source| ExtractError::Model {
            path: path.to_path_buf(),
            source,
        })?;
        if graph.name.is_empty() {
            graph.name = file_stem(path);
        }
        Ok(graph)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.contains("DS_Store")
}

/// Model files of `folder` with `extension` (case-insensitive), sorted by name
pub fn list_model_files(folder: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ExtractError::MissingInput(folder.to_path_buf()));
    }
    let suffix = format!(".{}", extension.trim_start_matches('.').to_lowercase());
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_hidden(name) && name.to_lowercase().ends_with(&suffix) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

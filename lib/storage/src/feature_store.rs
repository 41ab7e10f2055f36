// Feature folder: one `<fragment-key>.features` file per fragment
use crate::error::{Result, StorageError};
use samos_core::{Feature, Structure, FEATURE_FILE_SUFFIX};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Features read back from one fragment file
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentFile {
    pub key: String,
    pub features: Vec<Feature>,
    /// Lines that failed to parse
    pub skipped: usize,
}

/// A folder of feature files
#[derive(Debug, Clone)]
pub struct FeatureStore {
    folder: PathBuf,
}

impl FeatureStore {
    pub fn new<P: AsRef<Path>>(folder: P) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.folder)?;
        Ok(())
    }

    /// Remove every previous file and start from an empty folder
    pub fn reset(&self) -> Result<()> {
        if self.folder.exists() {
            fs::remove_dir_all(&self.folder)?;
        }
        self.create()
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.folder.join(format!("{}{}", key, FEATURE_FILE_SUFFIX))
    }

    /// Fragment key of a feature file path (the file name without suffix)
    pub fn fragment_key(path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.strip_suffix(FEATURE_FILE_SUFFIX)
            .map(str::to_string)
            .unwrap_or(name)
    }

    /// Feature files in lexicographic order of file name
    pub fn feature_files(&self) -> Result<Vec<PathBuf>> {
        if !self.folder.is_dir() {
            return Err(StorageError::MissingInput(self.folder.clone()));
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let path = entry?.path();
            let is_feature_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(FEATURE_FILE_SUFFIX) && !n.starts_with('.'))
                .unwrap_or(false);
            if is_feature_file && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Fragment keys in the same order as `feature_files`
    pub fn fragment_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .feature_files()?
            .iter()
            .map(|p| Self::fragment_key(p))
            .collect())
    }

    pub fn write_fragment(&self, key: &str, features: &[Feature]) -> Result<PathBuf> {
        let path = self.path_for(key);
        let mut writer = BufWriter::new(File::create(&path)?);
        for feature in features {
            writer.write_all(feature.to_line()?.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        debug!("wrote {} features to {:?}", features.len(), path);
        Ok(path)
    }

    /// Read one feature file; unparseable lines are logged and skipped
    pub fn read_fragment(&self, path: &Path, structure: Structure) -> Result<FragmentFile> {
        let bytes = fs::read(path)?;
        let mut features = Vec::new();
        let mut skipped = 0;
        for (line_no, raw) in bytes.split(|&b| b == b'\n').enumerate() {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    skipped += 1;
                    warn!("skipping {:?} line {}: {}", path, line_no + 1, e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match Feature::parse(line, structure) {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    skipped += 1;
                    warn!("skipping {:?} line {}: {}", path, line_no + 1, e);
                }
            }
        }
        Ok(FragmentFile {
            key: Self::fragment_key(path),
            features,
            skipped,
        })
    }

    /// Read every fragment in lexicographic order
    pub fn read_all(&self, structure: Structure) -> Result<Vec<FragmentFile>> {
        self.feature_files()?
            .iter()
            .map(|path| self.read_fragment(path, structure))
            .collect()
    }
}

//! Statistical back end
//!
//! Distance computation, clustering and clone ranking happen outside this
//! crate. A back end reads the emitted CSV files and leaves its results in the
//! results folder; for clustering that includes `clusterLabels.csv`.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

pub const DEFAULT_PROGRAM: &str = "Rscript";
pub const CLUSTER_SCRIPT: &str = "cluster.R";
pub const CLONE_SCRIPT: &str = "clones.R";

/// Input files of a clone detection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneInputs {
    pub full: PathBuf,
    pub mask: PathBuf,
    pub names: PathBuf,
    pub sizes: PathBuf,
}

pub trait StatsBackend: Send + Sync {
    fn cluster(&self, matrix: &Path, names: &Path, results: &Path, clusters: usize) -> Result<()>;

    fn detect_clones(&self, inputs: &CloneInputs, results: &Path) -> Result<()>;
}

/// Runs an external program with a script per goal
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    script_dir: PathBuf,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>, script_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script_dir: script_dir.into(),
        }
    }

    fn run(&self, script: &str, args: &[String]) -> Result<()> {
        let script = self.script_dir.join(script);
        info!("running {} {:?} {:?}", self.program, script, args);
        let status = Command::new(&self.program)
            .arg(&script)
            .args(args)
            .status()
            .with_context(|| format!("failed to start {}", self.program))?;
        if !status.success() {
            bail!("{} {:?} exited with {}", self.program, script, status);
        }
        Ok(())
    }
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, "r")
    }
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl StatsBackend for CommandBackend {
    fn cluster(&self, matrix: &Path, names: &Path, results: &Path, clusters: usize) -> Result<()> {
        self.run(
            CLUSTER_SCRIPT,
            &[arg(matrix), arg(names), arg(results), clusters.to_string()],
        )
    }

    fn detect_clones(&self, inputs: &CloneInputs, results: &Path) -> Result<()> {
        self.run(
            CLONE_SCRIPT,
            &[
                arg(&inputs.full),
                arg(&inputs.mask),
                arg(&inputs.names),
                arg(&inputs.sizes),
                arg(results),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = CommandBackend::new("samos-no-such-program", dir.path());
        let err = backend
            .cluster(&dir.path().join("m.csv"), &dir.path().join("n.csv"), dir.path(), 2)
            .unwrap_err();
        assert!(err.to_string().contains("samos-no-such-program"));
    }
}

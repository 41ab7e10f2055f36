//! Export of vector space model results
//!
//! Matrices are written as dense CSV: one row per line, values separated by
//! commas (never a trailing comma), every row terminated by a newline. The
//! sibling `names.csv` and `sizes.csv` files list one row label / row size per
//! line in matrix row order. All files are written atomically.

use crate::error::{Result, StorageError};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use samos_core::SparseMatrix;
use std::fmt::Display;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const NAMES_FILE: &str = "names.csv";
pub const SIZES_FILE: &str = "sizes.csv";
pub const CLUSTER_LABELS_FILE: &str = "clusterLabels.csv";
pub const PREDICTIONS_FILE: &str = "y_pred.json";

/// `vsm-<tag>.csv`
pub fn vsm_file_name(tag: &str) -> String {
    format!("vsm-{}.csv", tag)
}

/// Shortest round-trip formatting in the JVM `Double.toString` layout:
/// plain decimals with at least one fractional digit inside [1e-3, 1e7),
/// computerized scientific notation (`4.34E-4`, `1.0E7`) outside it
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{:?}", value);
    }
    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}

fn write_atomic<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut fs::File>) -> std::io::Result<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite).write(|file| {
        let mut writer = BufWriter::new(file);
        body(&mut writer)?;
        writer.flush()
    })?;
    Ok(())
}

/// Write the matrix densely; absent cells are written as `0.0`
pub fn write_matrix_csv(path: &Path, matrix: &SparseMatrix) -> Result<()> {
    let columns = matrix.column_count();
    write_atomic(path, |out| {
        for row in matrix.rows() {
            let mut cells = row.iter().peekable();
            for j in 0..columns {
                let value = match cells.peek() {
                    Some(&&(c, v)) if c as usize == j => {
                        cells.next();
                        v
                    }
                    _ => 0.0,
                };
                if j > 0 {
                    out.write_all(b",")?;
                }
                out.write_all(format_value(value).as_bytes())?;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    })?;
    info!(
        "wrote {}x{} matrix to {:?}",
        matrix.row_count(),
        columns,
        path
    );
    Ok(())
}

/// One value per line
pub fn write_lines<I, T>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    write_atomic(path, |out| {
        for line in lines {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    })
}

/// `names.csv`: one row label per line, in matrix row order
pub fn write_names<S: AsRef<str>>(vsm_folder: &Path, names: &[S]) -> Result<PathBuf> {
    let path = vsm_folder.join(NAMES_FILE);
    write_lines(&path, names.iter().map(AsRef::<str>::as_ref))?;
    Ok(path)
}

/// `sizes.csv`: the feature count of every row, in matrix row order
pub fn write_sizes(vsm_folder: &Path, sizes: &[usize]) -> Result<PathBuf> {
    let path = vsm_folder.join(SIZES_FILE);
    write_lines(&path, sizes)?;
    Ok(path)
}

/// First column of the back end's label CSV, header skipped
pub fn read_cluster_labels(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(StorageError::MissingInput(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let first = line.split(',').next().unwrap_or_default();
            first.trim().trim_matches('"').to_string()
        })
        .collect())
}

/// Publish the cluster labels as a JSON array next to the run root
pub fn publish_predictions(results_folder: &Path, root: &Path) -> Result<PathBuf> {
    let labels = read_cluster_labels(&results_folder.join(CLUSTER_LABELS_FILE))?;
    let path = root.join(PREDICTIONS_FILE);
    let json = serde_json::to_string(&labels)?;
    write_atomic(&path, |out| out.write_all(json.as_bytes()))?;
    info!("published {} cluster labels to {:?}", labels.len(), path);
    Ok(path)
}

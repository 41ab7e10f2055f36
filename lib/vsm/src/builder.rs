//! Vector space model builder
//!
//! One [`VsmBuilder::build`] call runs every phase for a frozen parameter
//! record:
//!
//! 1. ingest feature files in lexicographic order and intern the vocabulary
//! 2. fill the document matrix (quadratic approximate or linear exact)
//! 3. type weighting
//! 4. IDF weighting
//! 5. emit `vsm-<tag>.csv`, `names.csv` and optionally `sizes.csv`
//!
//! Comparator cache and weight warnings live only for the duration of one
//! build.

use crate::error::{Result, VsmError};
use crate::vocabulary::Vocabulary;
use crate::weighting::{idf_factors, TypeWeighter};
use ahash::AHashMap;
use rayon::prelude::*;
use samos_core::{Frequency, Idf, Parameters, SparseMatrix, SparseRow, VsmMode, WeightScheme};
use samos_nlp::NlpCache;
use samos_similarity::FeatureComparator;
use samos_storage::{vsm_file_name, write_matrix_csv, write_names, write_sizes, FeatureStore};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const PROGRESS_EVERY: usize = 100;

/// Ingested feature folder
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Row labels in row order
    pub names: Vec<String>,
    /// Vocabulary column of every feature of every row, in file order
    pub documents: Vec<Vec<u32>>,
    pub vocabulary: Vocabulary,
    pub skipped_lines: usize,
}

impl Corpus {
    #[inline]
    pub fn row_count(&self) -> usize {
        self.documents.len()
    }

    /// Feature count of every row
    pub fn sizes(&self) -> Vec<usize> {
        self.documents.iter().map(Vec::len).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VsmReport {
    pub rows: usize,
    pub columns: usize,
    pub nnz: usize,
    pub elapsed: Duration,
    pub matrix_path: PathBuf,
}

pub struct VsmBuilder {
    params: Parameters,
    nlp: Arc<NlpCache>,
    emit_sizes: bool,
}

impl VsmBuilder {
    pub fn new(params: Parameters, nlp: Arc<NlpCache>) -> Result<Self> {
        params
            .validate()
            .map_err(|e| VsmError::Parameters(e.to_string()))?;
        Ok(Self {
            params,
            nlp,
            emit_sizes: false,
        })
    }

    /// Also write `sizes.csv`
    #[must_use]
    pub fn with_sizes(mut self, emit_sizes: bool) -> Self {
        self.emit_sizes = emit_sizes;
        self
    }

    #[inline]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Run every phase and write the outputs into `vsm_folder`
    pub fn build(&self, store: &FeatureStore, vsm_folder: &Path, tag: &str) -> Result<VsmReport> {
        let start = Instant::now();
        info!("building vsm-{} with {}", tag, self.params.id());

        let corpus = self.ingest(store)?;
        let matrix = self.compute(&corpus)?;

        let matrix_path = vsm_folder.join(vsm_file_name(tag));
        write_matrix_csv(&matrix_path, &matrix)?;
        write_names(vsm_folder, &corpus.names)?;
        if self.emit_sizes {
            write_sizes(vsm_folder, &corpus.sizes())?;
        }

        let report = VsmReport {
            rows: matrix.row_count(),
            columns: matrix.column_count(),
            nnz: matrix.nnz(),
            elapsed: start.elapsed(),
            matrix_path,
        };
        info!(
            "vsm-{}: {} rows x {} columns, {} non-zero cells in {:?}",
            tag, report.rows, report.columns, report.nnz, report.elapsed
        );
        Ok(report)
    }

    /// Phase 1: parse every feature file and intern its features
    pub fn ingest(&self, store: &FeatureStore) -> Result<Corpus> {
        let mut corpus = Corpus::default();
        let files = store.feature_files()?;
        for (n, path) in files.iter().enumerate() {
            if n > 0 && n % PROGRESS_EVERY == 0 {
                info!("ingested {}/{} feature files", n, files.len());
            }
            let fragment = store.read_fragment(path, self.params.structure)?;
            corpus.skipped_lines += fragment.skipped;
            let row = fragment
                .features
                .into_iter()
                .map(|feature| corpus.vocabulary.intern(feature))
                .collect();
            corpus.names.push(fragment.key);
            corpus.documents.push(row);
        }
        info!(
            "ingested {} fragments, vocabulary of {} features, {} unparseable lines",
            corpus.row_count(),
            corpus.vocabulary.len(),
            corpus.skipped_lines
        );
        Ok(corpus)
    }

    /// Phases 2 to 4
    pub fn compute(&self, corpus: &Corpus) -> Result<SparseMatrix> {
        let rows = match self.params.vsm_mode {
            VsmMode::Linear => self.fill_linear(corpus),
            VsmMode::Quadratic => self.fill_quadratic(corpus),
        };
        let mut matrix = SparseMatrix::from_rows(rows, corpus.vocabulary.len())?;

        if self.params.weight != WeightScheme::Raw {
            let weights = TypeWeighter::new(self.params.weight).column_weights(&corpus.vocabulary);
            matrix.scale_columns(&weights);
        }
        if self.params.idf != Idf::None {
            let factors = idf_factors(&matrix, self.params.idf);
            matrix.scale_columns(&factors);
        }
        matrix.prune_zeros();
        Ok(matrix)
    }

    /// Exact identity: every feature only hits its own column
    fn fill_linear(&self, corpus: &Corpus) -> Vec<SparseRow> {
        corpus
            .documents
            .iter()
            .map(|features| {
                let mut cells: AHashMap<u32, f64> = AHashMap::new();
                for &column in features {
                    let cell = cells.entry(column).or_insert(0.0);
                    match self.params.frequency {
                        Frequency::Sum => *cell += 1.0,
                        Frequency::Max => *cell = 1.0,
                    }
                }
                into_row(cells)
            })
            .collect()
    }

    /// All-pairs approximate comparison, pruned to columns sharing the head type group
    fn fill_quadratic(&self, corpus: &Corpus) -> Vec<SparseRow> {
        let comparator = FeatureComparator::new(self.params, self.nlp.clone());
        let vocabulary = &corpus.vocabulary;

        let mut candidates: AHashMap<&str, Vec<u32>> = AHashMap::new();
        for (column, feature) in vocabulary.iter().enumerate() {
            candidates
                .entry(comparator.group_key(feature))
                .or_default()
                .push(column as u32);
        }
        debug!("{} candidate groups for pruning", candidates.len());

        let done = AtomicUsize::new(0);
        let total = corpus.row_count();
        let rows = corpus
            .documents
            .par_iter()
            .map(|features| {
                let mut cells: AHashMap<u32, f64> = AHashMap::new();
                for &fi in features {
                    let Some(feature) = vocabulary.get(fi) else {
                        continue;
                    };
                    let Some(columns) = candidates.get(comparator.group_key(feature)) else {
                        continue;
                    };
                    for &column in columns {
                        let Some(entry) = vocabulary.get(column) else {
                            continue;
                        };
                        let score = comparator.compare_indexed(fi, feature, column, entry);
                        if score <= 0.0 {
                            continue;
                        }
                        let cell = cells.entry(column).or_insert(0.0);
                        match self.params.frequency {
                            Frequency::Sum => *cell += score,
                            Frequency::Max => *cell = cell.max(score),
                        }
                    }
                }
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                if n % PROGRESS_EVERY == 0 {
                    info!("filled {}/{} rows", n, total);
                }
                into_row(cells)
            })
            .collect();
        comparator.clear_cache();
        rows
    }
}

// SparseMatrix::from_rows sorts the cells
fn into_row(cells: AHashMap<u32, f64>) -> SparseRow {
    cells.into_iter().collect()
}

use crate::error::{Error, Result};

/// Sparse row: `(column, value)` pairs sorted by column, no duplicates
pub type SparseRow = Vec<(u32, f64)>;

/// Compressed-row document matrix
///
/// Rows are documents (fragments), columns are vocabulary entries. Absent
/// cells are zero; only the rows are ever materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseMatrix {
    rows: Vec<SparseRow>,
    columns: usize,
}

impl SparseMatrix {
    #[must_use]
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![Vec::new(); rows],
            columns,
        }
    }

    /// Build from unsorted rows; out-of-range columns are rejected
    pub fn from_rows(mut rows: Vec<SparseRow>, columns: usize) -> Result<Self> {
        for (i, row) in rows.iter_mut().enumerate() {
            row.sort_by_key(|&(j, _)| j);
            row.dedup_by_key(|&mut (j, _)| j);
            if let Some(&(j, _)) = row.last() {
                if j as usize >= columns {
                    return Err(Error::OutOfBounds {
                        row: i,
                        column: j as usize,
                    });
                }
            }
        }
        Ok(Self { rows, columns })
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[(u32, f64)] {
        &self.rows[i]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[(u32, f64)]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of stored cells
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows
            .get(i)
            .and_then(|row| {
                row.binary_search_by_key(&(j as u32), |&(c, _)| c)
                    .ok()
                    .map(|pos| row[pos].1)
            })
            .unwrap_or(0.0)
    }

    /// Multiply every cell of column `j` by `factors[j]`
    pub fn scale_columns(&mut self, factors: &[f64]) {
        debug_assert_eq!(factors.len(), self.columns);
        for row in &mut self.rows {
            for (j, value) in row.iter_mut() {
                *value *= factors[*j as usize];
            }
        }
    }

    /// For each column, the number of rows holding a positive value
    pub fn document_frequencies(&self) -> Vec<usize> {
        let mut df = vec![0usize; self.columns];
        for row in &self.rows {
            for &(j, value) in row {
                if value > 0.0 {
                    df[j as usize] += 1;
                }
            }
        }
        df
    }

    /// Drop stored cells that became zero
    pub fn prune_zeros(&mut self) {
        for row in &mut self.rows {
            row.retain(|&(_, v)| v != 0.0);
        }
    }

    pub fn dense_row(&self, i: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.columns];
        for &(j, value) in &self.rows[i] {
            dense[j as usize] = value;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_sorts_and_checks_bounds() {
        let m = SparseMatrix::from_rows(vec![vec![(2, 1.0), (0, 3.0)], vec![]], 3).unwrap();
        assert_eq!(m.row(0), &[(0, 3.0), (2, 1.0)]);
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.nnz(), 2);

        assert!(matches!(
            SparseMatrix::from_rows(vec![vec![(5, 1.0)]], 3),
            Err(Error::OutOfBounds { row: 0, column: 5 })
        ));
    }

    #[test]
    fn test_dense_row() {
        let m = SparseMatrix::from_rows(vec![vec![], vec![(0, 0.25), (2, 0.75)]], 3).unwrap();
        assert_eq!(m.dense_row(1), vec![0.25, 0.0, 0.75]);
        assert_eq!(m.dense_row(0), vec![0.0, 0.0, 0.0]);
        assert_eq!(SparseMatrix::zeros(2, 3).dense_row(1), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scale_and_document_frequencies() {
        let mut m = SparseMatrix::from_rows(
            vec![vec![(0, 1.0), (1, 2.0)], vec![(0, 4.0)], vec![]],
            2,
        )
        .unwrap();
        assert_eq!(m.document_frequencies(), vec![2, 1]);

        m.scale_columns(&[0.5, 0.0]);
        assert_eq!(m.get(0, 0), 0.5);
        assert_eq!(m.get(1, 0), 2.0);
        assert_eq!(m.get(0, 1), 0.0);

        m.prune_zeros();
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.document_frequencies(), vec![2, 0]);
    }
}

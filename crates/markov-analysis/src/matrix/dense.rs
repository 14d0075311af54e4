//! Dense square transition matrix.
//!
//! Entry `(i, j)` is the probability of moving from vertex `i` to vertex `j`,
//! so distributions are row vectors and `M^k` row `i` is the `k`-step
//! distribution from `i`. Storage is an `nalgebra` [`DMatrix`] whose buffer
//! is reserved fallibly, so an oversized request surfaces as
//! [`GraphError::Allocation`] instead of aborting.

use nalgebra::DMatrix;
use serde::{Serialize, Serializer};

use markov_core::{GraphError, WeightedDigraph};

use super::MatrixError;

/// `n × n` matrix of transition probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    inner: DMatrix<f64>,
}

impl Serialize for TransitionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}

impl TransitionMatrix {
    /// All-zero `n × n` matrix.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] for `n = 0`, [`GraphError::Allocation`]
    /// if `n²` entries cannot be reserved.
    pub fn zeros(n: usize) -> Result<Self, MatrixError> {
        if n == 0 {
            return Err(
                GraphError::InvalidArgument("matrix size must be positive".to_string()).into(),
            );
        }
        let len = n
            .checked_mul(n)
            .ok_or(GraphError::Allocation {
                what: "matrix entries",
                count: usize::MAX,
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| GraphError::Allocation {
                what: "matrix entries",
                count: len,
            })?;
        data.resize(len, 0.0);
        Ok(Self {
            inner: DMatrix::from_vec(n, n, data),
        })
    }

    /// `n × n` identity.
    ///
    /// # Errors
    ///
    /// As [`TransitionMatrix::zeros`].
    pub fn identity(n: usize) -> Result<Self, MatrixError> {
        let mut m = Self::zeros(n)?;
        m.inner.fill_diagonal(1.0);
        Ok(m)
    }

    /// Dense matrix of `graph`'s edge weights. When parallel edges join the
    /// same pair, the one inserted last wins.
    ///
    /// # Errors
    ///
    /// As [`TransitionMatrix::zeros`]; the empty graph is invalid.
    pub fn from_graph(graph: &WeightedDigraph) -> Result<Self, MatrixError> {
        let mut m = Self::zeros(graph.vertex_count())?;
        for edge in graph.edges() {
            m.inner[(edge.from, edge.to)] = edge.weight;
        }
        Ok(m)
    }

    /// Build from explicit rows.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] if the rows do not form a non-empty
    /// square.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let n = rows.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != n) {
            return Err(GraphError::InvalidArgument(format!(
                "row {bad} has {} entries, expected {n}",
                rows[bad].len()
            ))
            .into());
        }
        let mut m = Self::zeros(n)?;
        for (i, row) in rows.iter().enumerate() {
            for (j, &p) in row.iter().enumerate() {
                m.inner[(i, j)] = p;
            }
        }
        Ok(m)
    }

    /// Side length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.nrows()
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.inner.get((i, j)).copied()
    }

    /// Row `i` as a vector.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        (i < self.size()).then(|| self.inner.row(i).iter().copied().collect())
    }

    /// All rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.inner
            .row_iter()
            .map(|r| r.iter().copied().collect())
            .collect()
    }

    /// The diagonal entries.
    pub fn diagonal(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.size()).map(|i| self.inner[(i, i)])
    }

    fn ensure_same_size(&self, other: &Self) -> Result<(), MatrixError> {
        if self.size() == other.size() {
            Ok(())
        } else {
            Err(MatrixError::DimensionMismatch {
                left: self.size(),
                right: other.size(),
            })
        }
    }

    /// `self · rhs` into a fresh matrix.
    ///
    /// # Errors
    ///
    /// [`MatrixError::DimensionMismatch`] if the sizes differ, or an
    /// allocation failure for the result.
    pub fn multiply(&self, rhs: &Self) -> Result<Self, MatrixError> {
        self.ensure_same_size(rhs)?;
        let mut out = Self::zeros(self.size())?;
        self.inner.mul_to(&rhs.inner, &mut out.inner);
        Ok(out)
    }

    /// `self · rhs` written into `out`, reusing its buffer. The borrow rules
    /// keep `out` distinct from both operands.
    ///
    /// # Errors
    ///
    /// [`MatrixError::DimensionMismatch`] if any size differs.
    pub fn multiply_into(&self, rhs: &Self, out: &mut Self) -> Result<(), MatrixError> {
        self.ensure_same_size(rhs)?;
        self.ensure_same_size(out)?;
        self.inner.mul_to(&rhs.inner, &mut out.inner);
        Ok(())
    }

    /// Overwrite `self` with the entries of `src`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::DimensionMismatch`] if the sizes differ.
    pub fn copy_from(&mut self, src: &Self) -> Result<(), MatrixError> {
        self.ensure_same_size(src)?;
        self.inner.copy_from(&src.inner);
        Ok(())
    }

    /// Sum of absolute entry-wise differences.
    ///
    /// # Errors
    ///
    /// [`MatrixError::DimensionMismatch`] if the sizes differ.
    pub fn diff_l1(&self, other: &Self) -> Result<f64, MatrixError> {
        self.ensure_same_size(other)?;
        Ok(self
            .inner
            .iter()
            .zip(other.inner.iter())
            .map(|(a, b)| (a - b).abs())
            .sum())
    }

    /// Largest deviation of a row sum from 1.0.
    #[must_use]
    pub fn max_row_defect(&self) -> f64 {
        self.inner
            .row_iter()
            .map(|r| (r.sum() - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

//! Per-class submatrices and class periods.

use serde::Serialize;
use tracing::{debug, instrument};

use markov_core::GraphError;

use super::{MatrixError, TransitionMatrix};

/// Projection of a transition matrix onto one class.
///
/// Local index `i` corresponds to original vertex `vertices[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubMatrix {
    pub matrix: TransitionMatrix,
    pub vertices: Vec<usize>,
}

impl SubMatrix {
    #[must_use]
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    /// Original vertex behind local index `local`.
    #[must_use]
    pub fn original_vertex(&self, local: usize) -> Option<usize> {
        self.vertices.get(local).copied()
    }
}

/// Extract the rows and columns of `class_vertices` (0-based), keeping the
/// given order.
///
/// # Errors
///
/// [`GraphError::Structural`] if a vertex is outside `0..m.size()`;
/// [`GraphError::InvalidArgument`] for an empty vertex list.
pub fn sub_matrix(
    m: &TransitionMatrix,
    class_vertices: &[usize],
) -> Result<SubMatrix, MatrixError> {
    if let Some(&bad) = class_vertices.iter().find(|&&v| v >= m.size()) {
        return Err(GraphError::Structural(format!(
            "class vertex {bad} outside 0..{}",
            m.size()
        ))
        .into());
    }

    let rows: Vec<Vec<f64>> = class_vertices
        .iter()
        .map(|&u| {
            class_vertices
                .iter()
                .map(|&v| m.get(u, v).unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(SubMatrix {
        matrix: TransitionMatrix::from_rows(&rows)?,
        vertices: class_vertices.to_vec(),
    })
}

/// Period of a (class) matrix: the gcd of every `k` in `1..=size` for which
/// some diagonal entry of `m^k` is positive.
///
/// Returns 0 when no return within `size` steps exists (a single vertex
/// without a self-loop) and 1 for an aperiodic class.
///
/// # Errors
///
/// Allocation failure for the working buffers.
#[instrument(skip(m), fields(size = m.size()))]
pub fn period(m: &TransitionMatrix) -> Result<usize, MatrixError> {
    let n = m.size();
    let mut power = m.clone();
    let mut scratch = TransitionMatrix::zeros(n)?;
    let mut g = 0;

    for k in 1..=n {
        if power.diagonal().any(|p| p > 0.0) {
            g = gcd(g, k);
            if g == 1 {
                break;
            }
        }
        if k < n {
            power.multiply_into(m, &mut scratch)?;
            std::mem::swap(&mut power, &mut scratch);
        }
    }

    debug!(period = g, "period computed");
    Ok(g)
}

const fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

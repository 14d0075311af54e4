//! Matrix powers and power-iteration convergence.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use markov_core::GraphError;

use super::{MatrixError, TransitionMatrix};

/// Outcome of [`power_iterate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerIteration {
    /// `true` if successive powers came within epsilon of each other.
    pub converged: bool,
    /// Number of multiplications performed.
    pub iterations: usize,
    /// L1 distance between the last two powers; `None` if no
    /// multiplication ran.
    pub diff: Option<f64>,
    /// The last computed power.
    pub result: TransitionMatrix,
}

/// Raise `m` to successive powers until `diff_l1(M^(k+1), M^k) <= epsilon`
/// or `max_iterations` multiplications have run.
///
/// Non-convergence is a normal outcome (periodic chains oscillate); it is
/// reported through [`PowerIteration::converged`], not as an error. With
/// `max_iterations = 0` the result is `m` itself.
///
/// # Errors
///
/// [`GraphError::InvalidArgument`] for a negative or non-finite epsilon, or
/// an allocation failure for the working buffer.
#[instrument(skip(m), fields(size = m.size()))]
pub fn power_iterate(
    m: &TransitionMatrix,
    epsilon: f64,
    max_iterations: usize,
) -> Result<PowerIteration, MatrixError> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(GraphError::InvalidArgument(format!(
            "epsilon must be finite and non-negative, got {epsilon}"
        ))
        .into());
    }

    let mut current = m.clone();
    let mut next = TransitionMatrix::zeros(m.size())?;
    let mut diff = None;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        current.multiply_into(m, &mut next)?;
        let d = next.diff_l1(&current)?;
        std::mem::swap(&mut current, &mut next);
        iterations += 1;
        diff = Some(d);
        if d <= epsilon {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(iterations, "power iteration converged");
    } else if max_iterations > 0 {
        warn!(
            iterations,
            diff = diff.unwrap_or(f64::NAN),
            "power iteration did not converge"
        );
    }

    Ok(PowerIteration {
        converged,
        iterations,
        diff,
        result: current,
    })
}

/// `m^k` by repeated squaring; `k = 0` gives the identity.
///
/// Takes `O(log k)` multiplications, so large step counts stay cheap.
///
/// # Errors
///
/// Allocation failure for the result or working buffers.
pub fn power(m: &TransitionMatrix, k: usize) -> Result<TransitionMatrix, MatrixError> {
    let mut acc = TransitionMatrix::identity(m.size())?;
    let mut base = m.clone();
    let mut scratch = TransitionMatrix::zeros(m.size())?;
    let mut remaining = k;
    while remaining > 0 {
        if remaining & 1 == 1 {
            acc.multiply_into(&base, &mut scratch)?;
            std::mem::swap(&mut acc, &mut scratch);
        }
        remaining >>= 1;
        if remaining > 0 {
            base.multiply_into(&base, &mut scratch)?;
            std::mem::swap(&mut base, &mut scratch);
        }
    }
    Ok(acc)
}

/// Distribution after `steps` transitions starting from vertex `start`
/// (0-based): row `start` of `m^steps`.
///
/// # Errors
///
/// [`GraphError::InvalidArgument`] if `start` is out of range.
pub fn distribution(
    m: &TransitionMatrix,
    start: usize,
    steps: usize,
) -> Result<Vec<f64>, MatrixError> {
    if start >= m.size() {
        return Err(GraphError::InvalidArgument(format!(
            "start vertex {start} outside 0..{}",
            m.size()
        ))
        .into());
    }
    let p = power(m, steps)?;
    p.row(start).ok_or_else(|| {
        let size = p.size();
        GraphError::Structural(format!("row {start} missing from power of size {size}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state() -> TransitionMatrix {
        TransitionMatrix::from_rows(&[vec![0.5, 0.5], vec![0.2, 0.8]]).expect("matrix")
    }

    fn flip() -> TransitionMatrix {
        TransitionMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).expect("matrix")
    }

    #[test]
    fn unit_matrix_converges_in_one_iteration() {
        let m = TransitionMatrix::from_rows(&[vec![1.0]]).expect("matrix");
        let r = power_iterate(&m, 0.01, 1000).expect("iterate");
        assert!(r.converged);
        assert_eq!(r.iterations, 1);
        assert_eq!(r.diff, Some(0.0));
        assert_eq!(r.result, m);
    }

    #[test]
    fn regular_chain_converges_to_stationary_rows() {
        let r = power_iterate(&two_state(), 1e-12, 1000).expect("iterate");
        assert!(r.converged);
        // Stationary distribution of [[.5,.5],[.2,.8]] is (2/7, 5/7).
        for row in r.result.rows() {
            assert!((row[0] - 2.0 / 7.0).abs() < 1e-9);
            assert!((row[1] - 5.0 / 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn periodic_chain_does_not_converge() {
        let r = power_iterate(&flip(), 0.01, 50).expect("iterate");
        assert!(!r.converged);
        assert_eq!(r.iterations, 50);
        assert_eq!(r.diff, Some(4.0));
    }

    #[test]
    fn zero_iterations_returns_input() {
        let r = power_iterate(&two_state(), 0.01, 0).expect("iterate");
        assert!(!r.converged);
        assert_eq!(r.iterations, 0);
        assert_eq!(r.diff, None);
        assert_eq!(r.result, two_state());
    }

    #[test]
    fn bad_epsilon_is_invalid() {
        for eps in [-0.1, f64::NAN, f64::INFINITY] {
            let err = power_iterate(&two_state(), eps, 10).unwrap_err();
            assert!(matches!(err, MatrixError::Graph(GraphError::InvalidArgument(_))));
        }
    }

    #[test]
    fn zero_epsilon_is_allowed() {
        let m = TransitionMatrix::identity(3).expect("identity");
        let r = power_iterate(&m, 0.0, 5).expect("iterate");
        assert!(r.converged);
        assert_eq!(r.iterations, 1);
    }

    #[test]
    fn power_zero_is_identity() {
        let p = power(&two_state(), 0).expect("power");
        assert_eq!(p, TransitionMatrix::identity(2).expect("identity"));
    }

    #[test]
    fn power_matches_repeated_multiply() {
        let m = two_state();
        let mut expected = TransitionMatrix::identity(2).expect("identity");
        for k in 0..=12 {
            let p = power(&m, k).expect("power");
            assert!(p.diff_l1(&expected).expect("diff") < 1e-12, "k = {k}");
            expected = expected.multiply(&m).expect("step");
        }
    }

    #[test]
    fn huge_exponent_stays_cheap() {
        // 10^9 ≡ 1 (mod 3), so the 3-cycle comes back to itself.
        let ring = TransitionMatrix::from_rows(&[
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ])
        .expect("ring");
        assert_eq!(power(&ring, 1_000_000_000).expect("power"), ring);

        let d = distribution(&two_state(), 0, 1 << 40).expect("distribution");
        assert!((d[0] - 2.0 / 7.0).abs() < 1e-9);
        assert!((d[1] - 5.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_zero_steps_is_unit_vector() {
        let d = distribution(&two_state(), 1, 0).expect("distribution");
        assert_eq!(d, vec![0.0, 1.0]);
    }

    #[test]
    fn distribution_follows_flip() {
        assert_eq!(distribution(&flip(), 0, 1).expect("d1"), vec![0.0, 1.0]);
        assert_eq!(distribution(&flip(), 0, 2).expect("d2"), vec![1.0, 0.0]);
    }

    #[test]
    fn distribution_rejects_bad_start() {
        let err = distribution(&two_state(), 2, 1).unwrap_err();
        assert!(matches!(err, MatrixError::Graph(GraphError::InvalidArgument(_))));
    }
}

//! Canonical tensor constructors.

use rand::Rng;

use crate::constants::EPSILON;
use crate::error::{Result, TensorError};
use crate::tensor::{MultiIndices, Tensor, Variance, validated_len};

impl Tensor {
    /// Zero tensor of the given shape.
    pub fn zeros(dimensions: Vec<usize>, variance: Vec<Variance>) -> Result<Self> {
        Self::new(dimensions, variance)
    }

    pub fn scalar(value: f64) -> Self {
        Self::from_parts(vec![], vec![], vec![value])
    }

    /// Mixed Kronecker delta `δ^μ_ν`.
    pub fn kronecker_delta(n: usize) -> Result<Self> {
        let mut delta = Self::new(vec![n, n], vec![Variance::Contravariant, Variance::Covariant])?;
        for i in 0..n {
            delta.set(&[i, i], 1.0)?;
        }
        Ok(delta)
    }

    /// Levi-Civita symbol of rank `n` in dimension `n`, all slots covariant.
    ///
    /// Built by enumerating all `n^n` index tuples: 0 on repeated indices,
    /// otherwise ±1 by the parity of the inversion count.
    pub fn levi_civita(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(TensorError::DegenerateDimension {
                required: 1,
                found: 0,
            });
        }
        let mut epsilon = Self::new(vec![n; n], vec![Variance::Covariant; n])?;
        for index in MultiIndices::new(vec![n; n]) {
            if let Some(sign) = permutation_sign(&index) {
                epsilon.set(&index, sign)?;
            }
        }
        Ok(epsilon)
    }

    /// Covariant rank-2 metric `g_{μν}` from a square symmetric matrix.
    pub fn metric_from_matrix(rows: &[Vec<f64>]) -> Result<Self> {
        let g = Self::matrix(rows, [Variance::Covariant, Variance::Covariant])?;
        let scale = g.norm_max().max(1.0);
        if !g.is_symmetric(0, 1, EPSILON * scale)? {
            return Err(TensorError::InvalidArgument(
                "metric matrix must be symmetric".to_string(),
            ));
        }
        Ok(g)
    }

    /// Square rank-2 tensor from rows, with explicit variance per slot.
    pub fn matrix(rows: &[Vec<f64>], variance: [Variance; 2]) -> Result<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != n) {
            return Err(TensorError::ShapeMismatch(format!(
                "row {bad} has {} entries, expected {n}",
                rows[bad].len()
            )));
        }
        let components = rows.iter().flatten().copied().collect();
        Self::from_components(vec![n, n], variance.to_vec(), components)
    }

    pub fn vector(components: Vec<f64>, variance: Variance) -> Result<Self> {
        Self::from_components(vec![components.len()], vec![variance], components)
    }

    /// Tensor with components drawn uniformly from [-1, 1).
    pub fn random(
        dimensions: Vec<usize>,
        variance: Vec<Variance>,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let len = validated_len(&dimensions, &variance)?;
        let components = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();
        Self::from_components(dimensions, variance, components)
    }
}

/// Sign of the permutation, or `None` when an index repeats.
fn permutation_sign(index: &[usize]) -> Option<f64> {
    let mut inversions = 0usize;
    for a in 0..index.len() {
        for b in (a + 1)..index.len() {
            if index[a] == index[b] {
                return None;
            }
            if index[a] > index[b] {
                inversions += 1;
            }
        }
    }
    Some(if inversions % 2 == 0 { 1.0 } else { -1.0 })
}

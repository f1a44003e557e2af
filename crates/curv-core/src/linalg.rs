//! Dense linear algebra on square rank-2 tensors.

use crate::constants::SINGULAR_PIVOT;
use crate::error::{Result, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    fn square_size(&self) -> Result<usize> {
        match self.dimensions() {
            [a, b] if a == b => Ok(*a),
            dims => Err(TensorError::ShapeMismatch(format!(
                "expected a square rank-2 tensor, got dimensions {dims:?}"
            ))),
        }
    }

    /// Matrix inverse via Gauss-Jordan elimination with partial pivoting.
    ///
    /// `g_{μν}` inverts to `g^{μν}`: when both slots share a variance they are
    /// flipped. A mixed tensor such as a Jacobian keeps its layout.
    pub fn inverse(&self) -> Result<Self> {
        let n = self.square_size()?;
        let inv = invert(self.components(), n)?;
        let variance = match self.variance() {
            [a, b] if a == b => vec![a.flipped(), b.flipped()],
            other => other.to_vec(),
        };
        Self::from_components(vec![n, n], variance, inv)
    }

    /// Determinant via LU elimination with partial pivoting.
    pub fn determinant(&self) -> Result<f64> {
        let n = self.square_size()?;
        Ok(determinant(self.components(), n))
    }
}

/// Inverse of a row-major `n×n` matrix.
pub(crate) fn invert(matrix: &[f64], n: usize) -> Result<Vec<f64>> {
    let width = 2 * n;
    let mut aug = vec![0.0; n * width];
    for i in 0..n {
        aug[i * width..i * width + n].copy_from_slice(&matrix[i * n..(i + 1) * n]);
        aug[i * width + n + i] = 1.0;
    }

    let scale = matrix.iter().fold(0.0f64, |m, c| m.max(c.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(TensorError::SingularMetric);
    }

    for col in 0..n {
        let (pivot_row, pivot_val) = (col..n)
            .map(|row| (row, aug[row * width + col].abs()))
            .fold((col, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if pivot_val < SINGULAR_PIVOT * scale {
            return Err(TensorError::SingularMetric);
        }

        if pivot_row != col {
            for k in 0..width {
                aug.swap(col * width + k, pivot_row * width + k);
            }
        }

        let pivot = aug[col * width + col];
        for k in 0..width {
            aug[col * width + k] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row * width + col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..width {
                aug[row * width + k] -= factor * aug[col * width + k];
            }
        }
    }

    let mut inv = vec![0.0; n * n];
    for i in 0..n {
        inv[i * n..(i + 1) * n].copy_from_slice(&aug[i * width + n..(i + 1) * width]);
    }
    Ok(inv)
}

pub(crate) fn determinant(matrix: &[f64], n: usize) -> f64 {
    let mut m = matrix.to_vec();
    let mut det = 1.0;

    for col in 0..n {
        let mut max_row = col;
        for row in (col + 1)..n {
            if m[row * n + col].abs() > m[max_row * n + col].abs() {
                max_row = row;
            }
        }
        if m[max_row * n + col] == 0.0 {
            return 0.0;
        }
        if max_row != col {
            for k in 0..n {
                m.swap(col * n + k, max_row * n + k);
            }
            det = -det;
        }

        let pivot = m[col * n + col];
        det *= pivot;
        for row in (col + 1)..n {
            let factor = m[row * n + col] / pivot;
            for k in (col + 1)..n {
                m[row * n + k] -= factor * m[col * n + k];
            }
        }
    }
    det
}

//! Levi-Civita connection of a [`Metric`], by numerical differentiation.

use crate::diff::{FiniteDifference, central_difference};
use crate::error::{Result, TensorError};
use crate::metric::{Metric, check_point};
use crate::tensor::{Tensor, Variance};

const CHRISTOFFEL_VARIANCE: [Variance; 3] = [
    Variance::Contravariant,
    Variance::Covariant,
    Variance::Covariant,
];

/// Christoffel symbols `Γ^λ_{μν}` of a metric, evaluated on demand.
///
/// Nothing is cached: each call re-differentiates the metric at the
/// requested point.
#[derive(Clone, Copy, Debug)]
pub struct Connection<'a, M: Metric + ?Sized> {
    metric: &'a M,
    fd: FiniteDifference,
}

impl<'a, M: Metric + ?Sized> Connection<'a, M> {
    pub fn new(metric: &'a M, fd: FiniteDifference) -> Result<Self> {
        fd.validate()?;
        Ok(Self { metric, fd })
    }

    pub fn metric(&self) -> &'a M {
        self.metric
    }

    pub fn finite_difference(&self) -> FiniteDifference {
        self.fd
    }

    pub fn dimension(&self) -> usize {
        self.metric.dimension()
    }

    /// `∂_k g_{ij}` as a covariant rank-3 tensor indexed `[k, i, j]`.
    pub fn metric_derivatives(&self, point: &[f64]) -> Result<Tensor> {
        let n = self.dimension();
        check_point(point, n)?;
        if self.metric.is_constant() {
            return Tensor::new(vec![n; 3], vec![Variance::Covariant; 3]);
        }
        let mut components = Vec::with_capacity(n * n * n);
        for k in 0..n {
            let d = central_difference(point, k, self.fd.metric_step, |x| {
                Ok(self.metric.metric_tensor(x)?.components().to_vec())
            })?;
            components.extend(d);
        }
        Tensor::from_components(vec![n; 3], vec![Variance::Covariant; 3], components)
    }

    /// All `Γ^λ_{μν} = ½ g^{λσ}(∂_μ g_{νσ} + ∂_ν g_{μσ} - ∂_σ g_{μν})` at
    /// `point`, as a rank-3 tensor with slots `[λ, μ, ν]`.
    pub fn christoffel_symbols(&self, point: &[f64]) -> Result<Tensor> {
        let n = self.dimension();
        tracing::trace!(n, ?point, "evaluating christoffel symbols");
        let g_inv = self.metric.inverse_metric(point)?;
        if self.metric.is_constant() {
            return Tensor::new(vec![n; 3], CHRISTOFFEL_VARIANCE.to_vec());
        }
        let dg = self.metric_derivatives(point)?;
        let (g_inv, dg) = (g_inv.components(), dg.components());
        let d = |k: usize, i: usize, j: usize| dg[(k * n + i) * n + j];

        let mut gamma = vec![0.0; n * n * n];
        for l in 0..n {
            for m in 0..n {
                for v in m..n {
                    let value: f64 = (0..n)
                        .map(|s| g_inv[l * n + s] * (d(m, v, s) + d(v, m, s) - d(s, m, v)))
                        .sum::<f64>()
                        * 0.5;
                    gamma[(l * n + m) * n + v] = value;
                    gamma[(l * n + v) * n + m] = value;
                }
            }
        }
        Tensor::from_components(vec![n; 3], CHRISTOFFEL_VARIANCE.to_vec(), gamma)
    }

    /// Single component `Γ^λ_{μν}`.
    pub fn christoffel(&self, point: &[f64], lambda: usize, mu: usize, nu: usize) -> Result<f64> {
        let n = self.dimension();
        let index = [lambda, mu, nu];
        if index.iter().any(|&i| i >= n) {
            return Err(TensorError::IndexOutOfRange {
                index: index.to_vec(),
                dimensions: vec![n; 3],
            });
        }
        self.christoffel_symbols(point)?.get(&index)
    }

    /// Coordinate acceleration of a geodesic, `-Γ^λ_{μν} u^μ u^ν`, at a
    /// single point. No trajectory is integrated.
    pub fn geodesic_acceleration(&self, point: &[f64], velocity: &[f64]) -> Result<Tensor> {
        let n = self.dimension();
        if velocity.len() != n {
            return Err(TensorError::ShapeMismatch(format!(
                "velocity has {} components, metric dimension is {n}",
                velocity.len()
            )));
        }
        let gamma = self.christoffel_symbols(point)?;
        let gamma = gamma.components();
        let accel = (0..n)
            .map(|l| {
                let mut sum = 0.0;
                for m in 0..n {
                    for v in 0..n {
                        sum += gamma[(l * n + m) * n + v] * velocity[m] * velocity[v];
                    }
                }
                -sum
            })
            .collect();
        Tensor::vector(accel, Variance::Contravariant)
    }
}

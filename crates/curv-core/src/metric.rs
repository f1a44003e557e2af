use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{EPSILON, NULL_TOLERANCE};
use crate::error::{Result, TensorError};
use crate::tensor::{Tensor, Variance};

/// Causal character of a displacement, in the mostly-plus convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Timelike,
    Spacelike,
    Lightlike,
}

impl Interval {
    /// `ds² < -tolerance` is timelike, `ds² > tolerance` spacelike, else lightlike.
    pub fn classify(ds2: f64, tolerance: f64) -> Self {
        if ds2 < -tolerance {
            Interval::Timelike
        } else if ds2 > tolerance {
            Interval::Spacelike
        } else {
            Interval::Lightlike
        }
    }

    /// Timelike or lightlike: reachable by a signal no faster than light.
    pub fn is_causal(self) -> bool {
        !matches!(self, Interval::Spacelike)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Timelike => write!(f, "timelike"),
            Interval::Spacelike => write!(f, "spacelike"),
            Interval::Lightlike => write!(f, "lightlike"),
        }
    }
}

/// A coordinate-dependent metric `x ↦ g_{μν}(x)` on an `n`-dimensional chart.
///
/// This is the single metric abstraction: constant metrics and
/// closure-backed metrics both implement it, and everything downstream
/// (connection, curvature, Lorentz helpers) only talks to this trait.
pub trait Metric {
    fn dimension(&self) -> usize;

    /// Covariant `g_{μν}` at `point`.
    fn metric_tensor(&self, point: &[f64]) -> Result<Tensor>;

    /// Contravariant `g^{μν}` at `point`. Fails with `SingularMetric` when
    /// the metric is not invertible there.
    fn inverse_metric(&self, point: &[f64]) -> Result<Tensor> {
        self.metric_tensor(point)?.inverse()
    }

    /// True when `g` does not depend on the point; the connection then
    /// vanishes identically.
    fn is_constant(&self) -> bool {
        false
    }

    fn determinant(&self, point: &[f64]) -> Result<f64> {
        self.metric_tensor(point)?.determinant()
    }

    /// `ds² = g_{μν}(x) dx^μ dx^ν`.
    fn line_element(&self, point: &[f64], tangent: &[f64]) -> Result<f64> {
        Ok(quadratic_form(&self.metric_tensor(point)?, tangent)?.0)
    }

    fn classify_interval(&self, point: &[f64], tangent: &[f64]) -> Result<Interval> {
        let (ds2, scale) = quadratic_form(&self.metric_tensor(point)?, tangent)?;
        Ok(Interval::classify(ds2, NULL_TOLERANCE * scale.max(1.0)))
    }
}

/// Returns `(g_{μν} v^μ v^ν, Σ|g_{μν} v^μ v^ν|)`; the second term scales the
/// null tolerance.
fn quadratic_form(g: &Tensor, v: &[f64]) -> Result<(f64, f64)> {
    let n = g.dimensions()[0];
    if v.len() != n {
        return Err(TensorError::ShapeMismatch(format!(
            "tangent has {} components, metric dimension is {n}",
            v.len()
        )));
    }
    let mut sum = 0.0;
    let mut magnitude = 0.0;
    for (k, g_ij) in g.components().iter().enumerate() {
        let term = g_ij * v[k / n] * v[k % n];
        sum += term;
        magnitude += term.abs();
    }
    Ok((sum, magnitude))
}

pub(crate) fn check_point(point: &[f64], dimension: usize) -> Result<()> {
    if point.len() != dimension {
        return Err(TensorError::ShapeMismatch(format!(
            "point has {} coordinates, metric dimension is {dimension}",
            point.len()
        )));
    }
    Ok(())
}

/// Validates a rank-2 metric value; returns its common slot variance.
fn check_metric_shape(g: &Tensor, dimension: usize) -> Result<Variance> {
    if g.rank() != 2 || g.dimensions() != [dimension, dimension] {
        return Err(TensorError::ShapeMismatch(format!(
            "metric must be {dimension}x{dimension}, got dimensions {:?}",
            g.dimensions()
        )));
    }
    let (a, b) = (g.variance()[0], g.variance()[1]);
    if a != b {
        return Err(TensorError::VarianceViolation {
            position: 1,
            expected: a,
            found: b,
        });
    }
    Ok(a)
}

type MetricFn = dyn Fn(&[f64]) -> Result<Tensor> + Send + Sync;

/// Metric backed by an arbitrary closure.
///
/// The closure may return either `g_{μν}` or `g^{μν}`; every value is
/// validated for shape and normalised so [`Metric::metric_tensor`] is always
/// covariant.
pub struct FunctionMetric {
    dimension: usize,
    f: Box<MetricFn>,
}

impl FunctionMetric {
    pub fn new<F>(dimension: usize, f: F) -> Result<Self>
    where
        F: Fn(&[f64]) -> Result<Tensor> + Send + Sync + 'static,
    {
        if dimension == 0 {
            return Err(TensorError::DegenerateDimension {
                required: 1,
                found: 0,
            });
        }
        Ok(Self {
            dimension,
            f: Box::new(f),
        })
    }

    fn evaluate(&self, point: &[f64]) -> Result<(Tensor, Variance)> {
        check_point(point, self.dimension)?;
        let g = (self.f)(point)?;
        let variance = check_metric_shape(&g, self.dimension)?;
        Ok((g, variance))
    }
}

impl Metric for FunctionMetric {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric_tensor(&self, point: &[f64]) -> Result<Tensor> {
        match self.evaluate(point)? {
            (g, Variance::Covariant) => Ok(g),
            (g_inv, Variance::Contravariant) => g_inv.inverse(),
        }
    }

    fn inverse_metric(&self, point: &[f64]) -> Result<Tensor> {
        match self.evaluate(point)? {
            (g, Variance::Covariant) => g.inverse(),
            (g_inv, Variance::Contravariant) => Ok(g_inv),
        }
    }
}

impl fmt::Debug for FunctionMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMetric")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

/// Point-independent metric. The inverse is computed once at construction.
#[derive(Clone, Debug)]
pub struct ConstantMetric {
    g: Tensor,
    g_inv: Tensor,
}

impl ConstantMetric {
    pub fn new(g: Tensor) -> Result<Self> {
        let n = g.dimensions().first().copied().unwrap_or(0);
        let variance = check_metric_shape(&g, n)?;
        if variance != Variance::Covariant {
            return Err(TensorError::VarianceViolation {
                position: 0,
                expected: Variance::Covariant,
                found: variance,
            });
        }
        if !g.is_symmetric(0, 1, EPSILON * g.norm_max().max(1.0))? {
            return Err(TensorError::InvalidArgument(
                "metric must be symmetric".to_string(),
            ));
        }
        let g_inv = g.inverse()?;
        Ok(Self { g, g_inv })
    }
}

impl Metric for ConstantMetric {
    fn dimension(&self) -> usize {
        self.g.dimensions()[0]
    }

    fn metric_tensor(&self, point: &[f64]) -> Result<Tensor> {
        check_point(point, self.dimension())?;
        Ok(self.g.clone())
    }

    fn inverse_metric(&self, point: &[f64]) -> Result<Tensor> {
        check_point(point, self.dimension())?;
        Ok(self.g_inv.clone())
    }

    fn is_constant(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(entries: &[f64]) -> Tensor {
        let n = entries.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { entries[i] } else { 0.0 }).collect())
            .collect();
        Tensor::metric_from_matrix(&rows).unwrap()
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(Interval::classify(-1.0, 1e-10), Interval::Timelike);
        assert_eq!(Interval::classify(1.0, 1e-10), Interval::Spacelike);
        assert_eq!(Interval::classify(1e-12, 1e-10), Interval::Lightlike);
        assert!(Interval::Lightlike.is_causal());
        assert!(!Interval::Spacelike.is_causal());
    }

    #[test]
    fn test_constant_metric_line_element() {
        let m = ConstantMetric::new(diag(&[-1.0, 1.0, 1.0, 1.0])).unwrap();
        let p = [0.0; 4];
        assert_eq!(m.line_element(&p, &[1.0, 0.5, 0.0, 0.0]).unwrap(), -0.75);
        assert_eq!(
            m.classify_interval(&p, &[1.0, 1.0, 0.0, 0.0]).unwrap(),
            Interval::Lightlike
        );
        assert_eq!(
            m.classify_interval(&p, &[1.0, 0.0, 2.0, 0.0]).unwrap(),
            Interval::Spacelike
        );
        assert!(m.is_constant());
    }

    #[test]
    fn test_constant_metric_rejects_bad_point_and_tangent() {
        let m = ConstantMetric::new(diag(&[-1.0, 1.0])).unwrap();
        assert!(matches!(
            m.metric_tensor(&[0.0; 3]),
            Err(TensorError::ShapeMismatch(_))
        ));
        assert!(m.line_element(&[0.0, 0.0], &[1.0]).is_err());
    }

    #[test]
    fn test_constant_metric_rejects_singular() {
        assert!(matches!(
            ConstantMetric::new(diag(&[1.0, 0.0])),
            Err(TensorError::SingularMetric)
        ));
    }

    #[test]
    fn test_function_metric_accepts_contravariant() {
        let m = FunctionMetric::new(2, |x| {
            let g_inv = Tensor::matrix(
                &[vec![1.0 / (x[0] * x[0]), 0.0], vec![0.0, 1.0]],
                [Variance::Contravariant; 2],
            )?;
            Ok(g_inv)
        })
        .unwrap();
        let g = m.metric_tensor(&[2.0, 0.0]).unwrap();
        assert_eq!(g.variance(), &[Variance::Covariant; 2]);
        assert!((g.get(&[0, 0]).unwrap() - 4.0).abs() < 1e-12);
        let inv = m.inverse_metric(&[2.0, 0.0]).unwrap();
        assert!((inv.get(&[0, 0]).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_function_metric_validates_shape() {
        let wrong_size = FunctionMetric::new(3, |_| Ok(diag(&[1.0, 1.0]))).unwrap();
        assert!(matches!(
            wrong_size.metric_tensor(&[0.0; 3]),
            Err(TensorError::ShapeMismatch(_))
        ));

        let mixed = FunctionMetric::new(2, |_| {
            Tensor::matrix(
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
                [Variance::Covariant, Variance::Contravariant],
            )
        })
        .unwrap();
        assert!(matches!(
            mixed.metric_tensor(&[0.0; 2]),
            Err(TensorError::VarianceViolation { .. })
        ));
    }

    #[test]
    fn test_function_metric_singular_inverse() {
        let m = FunctionMetric::new(2, |x| Ok(diag(&[1.0, x[0]]))).unwrap();
        assert!(m.inverse_metric(&[1.0, 0.0]).is_ok());
        assert!(matches!(
            m.inverse_metric(&[0.0, 0.0]),
            Err(TensorError::SingularMetric)
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(FunctionMetric::new(0, |_| Ok(Tensor::scalar(1.0))).is_err());
    }
}

//! Closed-form metrics for standard spacetimes and surfaces.
//!
//! Signature convention is mostly-plus `(-, +, +, +)`, natural units
//! (`c = G = 1`). Curvature derived from these is still numerical: the
//! connection differentiates the closed form by finite differences.

use crate::error::{Result, TensorError};
use crate::metric::{ConstantMetric, FunctionMetric};
use crate::tensor::Tensor;

fn diagonal(entries: &[f64]) -> Result<Tensor> {
    let n = entries.len();
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = entries[i];
            row
        })
        .collect();
    Tensor::metric_from_matrix(&rows)
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(TensorError::InvalidArgument(format!(
            "{name} must be finite and positive, got {value}"
        )));
    }
    Ok(())
}

/// Flat Minkowski metric `diag(-1, 1, …, 1)` in `n ≥ 2` dimensions.
pub fn minkowski(n: usize) -> Result<ConstantMetric> {
    if n < 2 {
        return Err(TensorError::DegenerateDimension {
            required: 2,
            found: n,
        });
    }
    let mut entries = vec![1.0; n];
    entries[0] = -1.0;
    ConstantMetric::new(diagonal(&entries)?)
}

/// Schwarzschild exterior in coordinates `(t, r, θ, φ)`:
///
/// `ds² = -(1 - rs/r) dt² + dr² / (1 - rs/r) + r² dθ² + r² sin²θ dφ²`
///
/// Evaluation at `r ≤ 0` or on the horizon `r = rs` fails with
/// `SingularMetric`; on the polar axis the metric is degenerate and fails
/// on inversion.
pub fn schwarzschild(rs: f64) -> Result<FunctionMetric> {
    positive("schwarzschild radius", rs)?;
    FunctionMetric::new(4, move |x| {
        let (r, theta) = (x[1], x[2]);
        let f = 1.0 - rs / r;
        if r <= 0.0 || f == 0.0 || !f.is_finite() {
            return Err(TensorError::SingularMetric);
        }
        let sin = theta.sin();
        diagonal(&[-f, 1.0 / f, r * r, r * r * sin * sin])
    })
}

/// Round 2-sphere of the given radius in coordinates `(θ, φ)`:
/// `ds² = R² dθ² + R² sin²θ dφ²`. Ricci scalar `2 / R²`.
pub fn two_sphere(radius: f64) -> Result<FunctionMetric> {
    positive("sphere radius", radius)?;
    let r2 = radius * radius;
    FunctionMetric::new(2, move |x| {
        let sin = x[0].sin();
        diagonal(&[r2, r2 * sin * sin])
    })
}

/// Spatially flat FLRW in comoving coordinates `(t, x, y, z)`:
/// `ds² = -dt² + a(t)² (dx² + dy² + dz²)`.
///
/// A scale factor that vanishes or is not finite at `t` makes the metric
/// singular there.
pub fn flrw<A>(scale_factor: A) -> Result<FunctionMetric>
where
    A: Fn(f64) -> f64 + Send + Sync + 'static,
{
    FunctionMetric::new(4, move |x| {
        let a = scale_factor(x[0]);
        if a == 0.0 || !a.is_finite() {
            return Err(TensorError::SingularMetric);
        }
        let a2 = a * a;
        diagonal(&[-1.0, a2, a2, a2])
    })
}

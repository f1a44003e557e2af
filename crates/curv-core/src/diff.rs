//! Central finite differences and their step sizes.
//!
//! Curvature is computed from two nested first derivatives:
//!
//! 1. `∂_k g_{ij}` by central differences with `metric_step = h`. Truncation
//!    error is `h²/6 · |g'''|`, rounding error is about `ε_mach · |g| / h`.
//! 2. `∂_k Γ^λ_{μν}` by central differences of step 1 with
//!    `connection_step = H`. Truncation adds `H²/6 · |Γ'''|`; the rounding
//!    noise of step 1 is divided by `H` again, giving about
//!    `ε_mach · |g| / (h · H)`.
//!
//! Both steps are relative: along axis `k` the shift is `step · max(1, |x_k|)`.
//! An absolute step would vanish below the spacing of representable values
//! at large coordinates, so `x ± h` would round back to `x`.
//!
//! With the defaults (`h = 1e-5`, `H = 1e-4`) and metric components of order
//! one, Christoffel symbols are good to ~1e-10 and Riemann components to
//! ~1e-7. [`FiniteDifference::estimated_error`] turns this into a number a
//! test can use as a tolerance.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONNECTION_STEP, DEFAULT_METRIC_STEP};
use crate::error::{Result, TensorError};

/// Relative step sizes of the two nested central differences.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiniteDifference {
    /// Step for derivatives of the metric (Christoffel symbols).
    pub metric_step: f64,
    /// Step for derivatives of the Christoffel symbols (Riemann tensor).
    pub connection_step: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self {
            metric_step: DEFAULT_METRIC_STEP,
            connection_step: DEFAULT_CONNECTION_STEP,
        }
    }
}

impl FiniteDifference {
    pub fn new(metric_step: f64, connection_step: f64) -> Result<Self> {
        let fd = Self {
            metric_step,
            connection_step,
        };
        fd.validate()?;
        Ok(fd)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, h) in [
            ("metric_step", self.metric_step),
            ("connection_step", self.connection_step),
        ] {
            if !(h.is_finite() && h > 0.0) {
                return Err(TensorError::InvalidArgument(format!(
                    "{name} must be finite and positive, got {h}"
                )));
            }
        }
        Ok(())
    }

    /// Rough absolute error of a Riemann component for a metric whose
    /// components and derivatives are bounded by `scale`.
    ///
    /// Assumes coordinates of order one. At `|x| > 1` the effective steps
    /// grow with `|x|`, which shrinks the rounding term and grows the
    /// truncation term by `|x|²`.
    pub fn estimated_error(&self, scale: f64) -> f64 {
        let (h, big_h) = (self.metric_step, self.connection_step);
        let truncation = (h * h + big_h * big_h) / 6.0;
        let rounding = f64::EPSILON / (h * big_h);
        scale * (truncation + rounding)
    }
}

/// Central difference of a vector-valued function along coordinate `axis`.
///
/// Returns `(f(x + h e_axis) - f(x - h e_axis)) / 2h` element-wise, with
/// `h = step · max(1, |x_axis|)`. Fails with `InvalidArgument` when the
/// shifted points collapse onto each other or a derivative is not finite.
pub fn central_difference<F>(point: &[f64], axis: usize, step: f64, f: F) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> Result<Vec<f64>>,
{
    if axis >= point.len() {
        return Err(TensorError::InvalidArgument(format!(
            "axis {axis} out of range for a {}-dimensional point",
            point.len()
        )));
    }
    let x = point[axis];
    let h = step * x.abs().max(1.0);
    // the actual separation, not 2h, after rounding of x ± h
    let span = (x + h) - (x - h);
    if !(span.is_finite() && span > 0.0) {
        return Err(TensorError::InvalidArgument(format!(
            "step {step} gives no usable separation at coordinate {axis} = {x}"
        )));
    }

    let mut shifted = point.to_vec();
    shifted[axis] = x + h;
    let plus = f(&shifted)?;
    shifted[axis] = x - h;
    let minus = f(&shifted)?;

    let derivative: Vec<f64> = plus.iter().zip(&minus).map(|(p, m)| (p - m) / span).collect();
    if let Some(k) = derivative.iter().position(|d| !d.is_finite()) {
        return Err(TensorError::InvalidArgument(format!(
            "derivative {k} along coordinate {axis} is not finite at {x}"
        )));
    }
    Ok(derivative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let fd = FiniteDifference::default();
        assert!(fd.validate().is_ok());
        assert!(fd.connection_step > fd.metric_step);
    }

    #[test]
    fn test_rejects_bad_steps() {
        assert!(FiniteDifference::new(0.0, 1e-4).is_err());
        assert!(FiniteDifference::new(1e-5, -1.0).is_err());
        assert!(FiniteDifference::new(f64::NAN, 1e-4).is_err());
    }

    #[test]
    fn test_central_difference_cubic() {
        // d/dx x³ at x = 2 is 12; central differences have O(h²) error
        let d = central_difference(&[2.0, 0.0], 0, 1e-4, |x| Ok(vec![x[0].powi(3)])).unwrap();
        assert!((d[0] - 12.0).abs() < 1e-6, "got {}", d[0]);
    }

    #[test]
    fn test_central_difference_other_axis() {
        let d = central_difference(&[1.0, 3.0], 1, 1e-5, |x| Ok(vec![x[0] * x[1], x[1].sin()]))
            .unwrap();
        assert!((d[0] - 1.0).abs() < 1e-9);
        assert!((d[1] - 3.0f64.cos()).abs() < 1e-9);
    }

    #[test]
    fn test_axis_out_of_range() {
        assert!(central_difference(&[1.0], 1, 1e-5, |x| Ok(x.to_vec())).is_err());
    }

    #[test]
    fn test_step_scales_with_large_coordinate() {
        // an absolute 1e-5 step is below the spacing of f64 values at 1e17
        for x in [1e12, 1e17] {
            let d = central_difference(&[x, 0.0], 0, 1e-5, |p| Ok(vec![3.0 * p[0], 7.0]))
                .unwrap();
            assert!((d[0] - 3.0).abs() < 1e-9, "got {} at {x}", d[0]);
            assert_eq!(d[1], 0.0);
        }
    }

    #[test]
    fn test_non_finite_point_or_value_rejected() {
        assert!(matches!(
            central_difference(&[f64::NAN], 0, 1e-5, |x| Ok(x.to_vec())),
            Err(TensorError::InvalidArgument(_))
        ));
        assert!(matches!(
            central_difference(&[f64::INFINITY], 0, 1e-5, |x| Ok(x.to_vec())),
            Err(TensorError::InvalidArgument(_))
        ));
        // the function blows up at the plus shift
        let d = central_difference(&[0.0], 0, 1e-5, |x| {
            Ok(vec![if x[0] > 0.0 { f64::INFINITY } else { 0.0 }])
        });
        assert!(matches!(d, Err(TensorError::InvalidArgument(_))));
    }

    #[test]
    fn test_estimated_error_order() {
        let fd = FiniteDifference::default();
        let e = fd.estimated_error(1.0);
        assert!(e > 1e-10 && e < 1e-5, "unexpected estimate {e}");
    }

    #[test]
    fn test_deserialize_partial_config() {
        let fd: FiniteDifference = serde_json::from_str(r#"{"metric_step": 2e-5}"#).unwrap();
        assert_eq!(fd.metric_step, 2e-5);
        assert_eq!(fd.connection_step, DEFAULT_CONNECTION_STEP);
    }
}

//! Lorentz boosts as coordinate transformations of flat spacetime.
//!
//! Boosts are plain Jacobian tensors applied through [`Tensor::transform`];
//! intervals are measured through the [`Metric`] trait, so the signature
//! convention lives only in [`crate::spacetimes::minkowski`].
//!
//! Natural units: velocities are fractions of `c = 1`.

use crate::error::{Result, TensorError};
use crate::tensor::{Tensor, Variance};

const JACOBIAN_VARIANCE: [Variance; 2] = [Variance::Contravariant, Variance::Covariant];

/// Lorentz factor `1 / sqrt(1 - v²)`.
pub fn gamma(velocity: f64) -> Result<f64> {
    check_velocity(velocity)?;
    Ok(1.0 / (1.0 - velocity * velocity).sqrt())
}

/// `atanh(v)`; rapidities add under collinear composition.
pub fn rapidity(velocity: f64) -> Result<f64> {
    check_velocity(velocity)?;
    Ok(velocity.atanh())
}

/// Relativistic addition of collinear velocities, `(u + v) / (1 + uv)`.
pub fn compose_velocities(u: f64, v: f64) -> Result<f64> {
    check_velocity(u)?;
    check_velocity(v)?;
    Ok((u + v) / (1.0 + u * v))
}

fn check_velocity(v: f64) -> Result<()> {
    if !(v.is_finite() && v.abs() < 1.0) {
        return Err(TensorError::InvalidArgument(format!(
            "velocity must satisfy |v| < 1, got {v}"
        )));
    }
    Ok(())
}

/// Jacobian `Λ^a_b` of a boost with `velocity` along spatial `axis`
/// (`1 ≤ axis < dimension`), coordinate 0 being time.
pub fn boost(dimension: usize, axis: usize, velocity: f64) -> Result<Tensor> {
    if dimension < 2 {
        return Err(TensorError::DegenerateDimension {
            required: 2,
            found: dimension,
        });
    }
    if axis == 0 || axis >= dimension {
        return Err(TensorError::InvalidArgument(format!(
            "boost axis must be spatial (1..{dimension}), got {axis}"
        )));
    }
    let g = gamma(velocity)?;
    let mut lambda = Tensor::new(vec![dimension; 2], JACOBIAN_VARIANCE.to_vec())?;
    for i in 0..dimension {
        lambda.set(&[i, i], 1.0)?;
    }
    lambda.set(&[0, 0], g)?;
    lambda.set(&[axis, axis], g)?;
    lambda.set(&[0, axis], -g * velocity)?;
    lambda.set(&[axis, 0], -g * velocity)?;
    Ok(lambda)
}

/// The boost undoing [`boost`] with the same arguments.
pub fn inverse_boost(dimension: usize, axis: usize, velocity: f64) -> Result<Tensor> {
    boost(dimension, axis, -velocity)
}

/// Matrix product `(Λ₂ Λ₁)^a_c = Λ₂^a_b Λ₁^b_c`: apply `first`, then `second`.
pub fn compose(second: &Tensor, first: &Tensor) -> Result<Tensor> {
    second.tensor_product(first).contract(1, 2)
}

/// Components of `tensor` in the frame moving with `velocity` along `axis`.
pub fn boost_tensor(tensor: &Tensor, axis: usize, velocity: f64) -> Result<Tensor> {
    let n = tensor.dimensions().first().copied().unwrap_or(0);
    if tensor.rank() == 0 {
        return Ok(tensor.clone());
    }
    tensor.transform(&boost(n, axis, velocity)?, &inverse_boost(n, axis, velocity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Interval, Metric};
    use crate::spacetimes::minkowski;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn event(c: &[f64]) -> Tensor {
        Tensor::vector(c.to_vec(), Variance::Contravariant).unwrap()
    }

    #[test]
    fn test_boost_times_inverse_is_identity() {
        let b = boost(4, 2, 0.6).unwrap();
        let inv = inverse_boost(4, 2, 0.6).unwrap();
        let id = compose(&inv, &b).unwrap();
        assert!(id.approx_eq(&Tensor::kronecker_delta(4).unwrap(), 1e-12));
    }

    #[test]
    fn test_interval_invariance() {
        let m = minkowski(4).unwrap();
        let origin = [0.0; 4];
        let dx = event(&[3.0, 2.0, 0.5, -1.0]);
        let boosted = boost_tensor(&dx, 1, 0.6).unwrap();
        let before = m.line_element(&origin, dx.components()).unwrap();
        let after = m.line_element(&origin, boosted.components()).unwrap();
        assert_abs_diff_eq!(before, after, epsilon = 1e-9);
    }

    #[test]
    fn test_null_preserved() {
        let m = minkowski(2).unwrap();
        let ray = event(&[3.0, 3.0]);
        let boosted = boost_tensor(&ray, 1, 0.5).unwrap();
        assert_eq!(
            m.classify_interval(&[0.0, 0.0], boosted.components()).unwrap(),
            Interval::Lightlike
        );
    }

    #[test]
    fn test_boost_composition_matches_velocity_addition() {
        let (v1, v2) = (0.3, 0.4);
        let sequential = compose(&boost(4, 1, v2).unwrap(), &boost(4, 1, v1).unwrap()).unwrap();
        let single = boost(4, 1, compose_velocities(v1, v2).unwrap()).unwrap();
        assert!(sequential.approx_eq(&single, 1e-12));
    }

    #[test]
    fn test_rapidities_add() {
        let (v1, v2) = (0.25, -0.7);
        let combined = rapidity(compose_velocities(v1, v2).unwrap()).unwrap();
        let sum = rapidity(v1).unwrap() + rapidity(v2).unwrap();
        assert_abs_diff_eq!(combined, sum, epsilon = 1e-12);
    }

    #[test]
    fn test_covector_pairing_invariant() {
        // p_μ dx^μ is frame independent
        let m = minkowski(4).unwrap();
        let g = m.metric_tensor(&[0.0; 4]).unwrap();
        let p = event(&[2.0, 0.3, 0.1, 0.0]).lower_index(0, &g).unwrap();
        let dx = event(&[1.0, -0.5, 2.0, 0.2]);
        let before = p.contract_all(&dx).unwrap();
        let after = boost_tensor(&p, 3, -0.8)
            .unwrap()
            .contract_all(&boost_tensor(&dx, 3, -0.8).unwrap())
            .unwrap();
        assert_abs_diff_eq!(before, after, epsilon = 1e-9);
    }

    #[test]
    fn test_boost_leaves_metric_invariant() {
        let m = minkowski(4).unwrap();
        let g = m.metric_tensor(&[0.0; 4]).unwrap();
        let boosted = boost_tensor(&g, 1, 0.9).unwrap();
        assert!(boosted.approx_eq(&g, 1e-9));
    }

    #[test]
    fn test_rejects_superluminal_and_bad_axis() {
        assert!(boost(4, 1, 1.0).is_err());
        assert!(boost(4, 0, 0.5).is_err());
        assert!(boost(4, 4, 0.5).is_err());
        assert!(compose_velocities(0.5, -1.2).is_err());
    }

    proptest! {
        #[test]
        fn prop_interval_invariance(
            v in -0.9_f64..0.9_f64,
            t in -10.0_f64..10.0_f64,
            x in -10.0_f64..10.0_f64,
        ) {
            let m = minkowski(2).unwrap();
            let dx = event(&[t, x]);
            let boosted = boost_tensor(&dx, 1, v).unwrap();
            let before = m.line_element(&[0.0, 0.0], dx.components()).unwrap();
            let after = m.line_element(&[0.0, 0.0], boosted.components()).unwrap();
            prop_assert!((before - after).abs() < 1e-8 * (1.0 + before.abs()));
        }

        #[test]
        fn prop_boost_composition(
            v1 in -0.6_f64..0.6_f64,
            v2 in -0.6_f64..0.6_f64,
        ) {
            let sequential = compose(&boost(2, 1, v2).unwrap(), &boost(2, 1, v1).unwrap()).unwrap();
            let single = boost(2, 1, compose_velocities(v1, v2).unwrap()).unwrap();
            prop_assert!(sequential.approx_eq(&single, 1e-9));
        }
    }
}

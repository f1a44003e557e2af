//! Curvature of a [`Metric`]: Riemann, Ricci, Einstein and Weyl tensors and
//! their scalar invariants.
//!
//! Everything is a pure function of `(metric, point)`:
//!
//! ```text
//! metric → Γ(x) → Riemann(x) → { Ricci(x), Weyl(x) } → { R(x), G(x), K(x) }
//! ```
//!
//! The Riemann tensor needs `∂Γ`, which is a central difference of a
//! quantity that is itself a central difference of the metric. See
//! [`crate::diff`] for the resulting error budget; results must always be
//! compared against expectations with a tolerance.

use crate::connection::Connection;
use crate::diff::{FiniteDifference, central_difference};
use crate::error::{Result, TensorError};
use crate::metric::Metric;
use crate::tensor::{Tensor, Variance};

const RIEMANN_VARIANCE: [Variance; 4] = [
    Variance::Contravariant,
    Variance::Covariant,
    Variance::Covariant,
    Variance::Covariant,
];

/// Curvature evaluator bound to one metric and one differentiation setting.
#[derive(Clone, Copy, Debug)]
pub struct Curvature<'a, M: Metric + ?Sized> {
    connection: Connection<'a, M>,
}

/// Weyl tensor, or the statement that it vanishes identically.
///
/// In fewer than three dimensions the general formula divides by zero and
/// the tensor is zero by construction, so no components are produced.
#[derive(Clone, Debug)]
pub enum Weyl {
    Vanishing { dimension: usize },
    Tensor(Tensor),
}

impl Weyl {
    pub fn is_vanishing(&self) -> bool {
        matches!(self, Weyl::Vanishing { .. })
    }

    /// Components `C^ρ_{σμν}`. Fails with `DegenerateDimension` for the
    /// vanishing case.
    pub fn into_tensor(self) -> Result<Tensor> {
        match self {
            Weyl::Tensor(c) => Ok(c),
            Weyl::Vanishing { dimension } => Err(TensorError::DegenerateDimension {
                required: 3,
                found: dimension,
            }),
        }
    }
}

impl<'a, M: Metric + ?Sized> Curvature<'a, M> {
    pub fn new(metric: &'a M, fd: FiniteDifference) -> Result<Self> {
        Ok(Self {
            connection: Connection::new(metric, fd)?,
        })
    }

    pub fn connection(&self) -> &Connection<'a, M> {
        &self.connection
    }

    fn metric(&self) -> &'a M {
        self.connection.metric()
    }

    fn dimension(&self) -> usize {
        self.connection.dimension()
    }

    /// `R^ρ_{σμν} = ∂_μΓ^ρ_{νσ} - ∂_νΓ^ρ_{μσ} + Γ^ρ_{μλ}Γ^λ_{νσ} - Γ^ρ_{νλ}Γ^λ_{μσ}`
    pub fn riemann(&self, point: &[f64]) -> Result<Tensor> {
        let n = self.dimension();
        tracing::debug!(n, ?point, "computing riemann tensor");

        let gamma = self.connection.christoffel_symbols(point)?;
        if self.metric().is_constant() {
            return Tensor::new(vec![n; 4], RIEMANN_VARIANCE.to_vec());
        }

        let step = self.connection.finite_difference().connection_step;
        let d_gamma = (0..n)
            .map(|axis| {
                central_difference(point, axis, step, |x| {
                    Ok(self.connection.christoffel_symbols(x)?.components().to_vec())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let g = gamma.components();
        let gam = |a: usize, b: usize, c: usize| g[(a * n + b) * n + c];
        let dgam =
            |axis: usize, a: usize, b: usize, c: usize| d_gamma[axis][(a * n + b) * n + c];

        let mut r = vec![0.0; n * n * n * n];
        for rho in 0..n {
            for sigma in 0..n {
                for mu in 0..n {
                    for nu in (mu + 1)..n {
                        let mut value = dgam(mu, rho, nu, sigma) - dgam(nu, rho, mu, sigma);
                        for l in 0..n {
                            value += gam(rho, mu, l) * gam(l, nu, sigma)
                                - gam(rho, nu, l) * gam(l, mu, sigma);
                        }
                        let base = (rho * n + sigma) * n;
                        r[(base + mu) * n + nu] = value;
                        r[(base + nu) * n + mu] = -value;
                    }
                }
            }
        }
        Tensor::from_components(vec![n; 4], RIEMANN_VARIANCE.to_vec(), r)
    }

    /// Fully covariant `R_{ρσμν} = g_{ρα} R^α_{σμν}`.
    pub fn riemann_lowered(&self, point: &[f64]) -> Result<Tensor> {
        let g = self.metric().metric_tensor(point)?;
        self.riemann(point)?.lower_index(0, &g)
    }

    /// `R_{σν} = R^ρ_{σρν}`.
    pub fn ricci(&self, point: &[f64]) -> Result<Tensor> {
        self.riemann(point)?.contract(0, 2)
    }

    /// `R = g^{σν} R_{σν}`.
    pub fn ricci_scalar(&self, point: &[f64]) -> Result<f64> {
        let ricci = self.ricci(point)?;
        let g_inv = self.metric().inverse_metric(point)?;
        scalar_from_ricci(&ricci, &g_inv)
    }

    /// `|R| < tolerance`.
    ///
    /// A vanishing Ricci scalar does not imply a flat manifold (Schwarzschild
    /// has `R = 0`); [`Self::is_riemann_flat`] checks every component.
    pub fn is_flat(&self, point: &[f64], tolerance: f64) -> Result<bool> {
        Ok(self.ricci_scalar(point)?.abs() < tolerance)
    }

    /// Every Riemann component below `tolerance` in magnitude.
    pub fn is_riemann_flat(&self, point: &[f64], tolerance: f64) -> Result<bool> {
        Ok(self.riemann(point)?.norm_max() < tolerance)
    }

    /// `G_{μν} = R_{μν} - ½ R g_{μν}`.
    pub fn einstein(&self, point: &[f64]) -> Result<Tensor> {
        let ricci = self.ricci(point)?;
        let g = self.metric().metric_tensor(point)?;
        let g_inv = self.metric().inverse_metric(point)?;
        let scalar = scalar_from_ricci(&ricci, &g_inv)?;
        ricci.subtract(&g.scale(0.5 * scalar))
    }

    /// Trace-free part of the Riemann tensor, `C^ρ_{σμν}`:
    ///
    /// `C_{abcd} = R_{abcd}
    ///   - (g_{ac}R_{bd} - g_{ad}R_{bc} - g_{bc}R_{ad} + g_{bd}R_{ac}) / (n-2)
    ///   + R (g_{ac}g_{bd} - g_{ad}g_{bc}) / ((n-1)(n-2))`
    pub fn weyl(&self, point: &[f64]) -> Result<Weyl> {
        let n = self.dimension();
        if n < 3 {
            tracing::debug!(n, "weyl tensor vanishes identically below three dimensions");
            return Ok(Weyl::Vanishing { dimension: n });
        }

        let riemann = self.riemann(point)?;
        let g = self.metric().metric_tensor(point)?;
        let g_inv = self.metric().inverse_metric(point)?;
        let lowered = riemann.lower_index(0, &g)?;
        let ricci = riemann.contract(0, 2)?;
        let scalar = scalar_from_ricci(&ricci, &g_inv)?;

        let (gc, rc) = (g.components(), ricci.components());
        let gm = |a: usize, b: usize| gc[a * n + b];
        let ric = |a: usize, b: usize| rc[a * n + b];
        let nf = n as f64;
        let ricci_factor = 1.0 / (nf - 2.0);
        let scalar_factor = scalar / ((nf - 1.0) * (nf - 2.0));

        let mut c = lowered.components().to_vec();
        for (flat, out) in c.iter_mut().enumerate() {
            let (a, b, cc, d) = (
                flat / (n * n * n),
                (flat / (n * n)) % n,
                (flat / n) % n,
                flat % n,
            );
            let ricci_part = gm(a, cc) * ric(b, d) - gm(a, d) * ric(b, cc)
                - gm(b, cc) * ric(a, d)
                + gm(b, d) * ric(a, cc);
            let scalar_part = gm(a, cc) * gm(b, d) - gm(a, d) * gm(b, cc);
            *out -= ricci_factor * ricci_part;
            *out += scalar_factor * scalar_part;
        }

        let weyl_lowered = Tensor::from_components(vec![n; 4], vec![Variance::Covariant; 4], c)?;
        Ok(Weyl::Tensor(weyl_lowered.raise_index(0, &g_inv)?))
    }

    /// Kretschmann scalar `R_{ρσμν} R^{ρσμν}`.
    pub fn kretschmann(&self, point: &[f64]) -> Result<f64> {
        let riemann = self.riemann(point)?;
        let g = self.metric().metric_tensor(point)?;
        let g_inv = self.metric().inverse_metric(point)?;
        let lowered = riemann.lower_index(0, &g)?;
        let raised = riemann
            .raise_index(1, &g_inv)?
            .raise_index(2, &g_inv)?
            .raise_index(3, &g_inv)?;
        lowered.contract_all(&raised)
    }

    /// Tidal operator at `point`; see [`GeodesicDeviation`].
    pub fn geodesic_deviation(&self, point: &[f64]) -> Result<GeodesicDeviation> {
        GeodesicDeviation::new(self.riemann(point)?)
    }
}

fn scalar_from_ricci(ricci: &Tensor, g_inv: &Tensor) -> Result<f64> {
    ricci.raise_index(0, g_inv)?.trace()
}

/// Relative acceleration of neighbouring geodesics from a Riemann tensor
/// `R^μ_{νρσ}`.
#[derive(Clone, Debug)]
pub struct GeodesicDeviation {
    riemann: Tensor,
}

impl GeodesicDeviation {
    pub fn new(riemann: Tensor) -> Result<Self> {
        let n = riemann.dimensions().first().copied().unwrap_or(0);
        if riemann.rank() != 4 || riemann.dimensions().iter().any(|&d| d != n) {
            return Err(TensorError::ShapeMismatch(format!(
                "riemann tensor must be rank 4 with equal dimensions, got {:?}",
                riemann.dimensions()
            )));
        }
        if let Some(position) = (0..4).find(|&k| riemann.variance()[k] != RIEMANN_VARIANCE[k]) {
            return Err(TensorError::VarianceViolation {
                position,
                expected: RIEMANN_VARIANCE[position],
                found: riemann.variance()[position],
            });
        }
        Ok(Self { riemann })
    }

    pub fn riemann(&self) -> &Tensor {
        &self.riemann
    }

    /// `K^μ_ρ = R^μ_{νρσ} u^ν u^σ` for a tangent `u`.
    pub fn tidal_tensor(&self, tangent: &Tensor) -> Result<Tensor> {
        self.check_vector(tangent, "tangent")?;
        self.riemann
            .tensor_product(tangent)
            .contract(1, 4)?
            .tensor_product(tangent)
            .contract(2, 3)
    }

    /// `A^μ = -R^μ_{νρσ} u^ν ξ^ρ u^σ` for tangent `u` and separation `ξ`.
    pub fn relative_acceleration(&self, tangent: &Tensor, separation: &Tensor) -> Result<Tensor> {
        self.check_vector(separation, "separation")?;
        let tidal = self.tidal_tensor(tangent)?;
        Ok(-tidal.tensor_product(separation).contract(1, 2)?)
    }

    fn check_vector(&self, v: &Tensor, name: &str) -> Result<()> {
        let n = self.riemann.dimensions()[0];
        if v.rank() != 1 || v.dimensions()[0] != n {
            return Err(TensorError::ShapeMismatch(format!(
                "{name} must be a vector of dimension {n}, got {:?}",
                v.dimensions()
            )));
        }
        if v.variance()[0] != Variance::Contravariant {
            return Err(TensorError::VarianceViolation {
                position: 0,
                expected: Variance::Contravariant,
                found: v.variance()[0],
            });
        }
        Ok(())
    }
}

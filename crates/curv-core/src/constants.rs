/// Default tolerance for component-wise floating comparisons.
pub const EPSILON: f64 = 1e-10;

/// Pivot magnitude (relative to the largest entry) below which a matrix
/// is treated as singular.
pub const SINGULAR_PIVOT: f64 = 1e-12;

/// Allowed deviation of `J · J⁻¹` from the identity, relative to the
/// magnitude of both factors, when a coordinate transform is applied.
pub const INVERSE_PAIR_TOLERANCE: f64 = 1e-8;

/// Central-difference step for first derivatives of the metric.
/// Close to cbrt(f64::EPSILON) ≈ 6e-6, the optimum for O(h²) differences.
pub const DEFAULT_METRIC_STEP: f64 = 1e-5;

/// Central-difference step for derivatives of the Christoffel symbols.
/// Wider than the metric step: the inner rounding noise (~eps / metric_step)
/// is divided by this step again.
pub const DEFAULT_CONNECTION_STEP: f64 = 1e-4;

/// Tolerance used to call an interval lightlike.
pub const NULL_TOLERANCE: f64 = 1e-10;

/// Default tolerance for flatness checks on numerically derived curvature.
pub const FLATNESS_TOLERANCE: f64 = 1e-8;

//! Tensor algebra and numerical curvature of coordinate manifolds.
//!
//! Three layers, each built on the one below:
//!
//! - [`Tensor`]: arbitrary-rank arrays with per-index [`Variance`] and the
//!   usual algebra (products, contraction, index raising/lowering, coordinate
//!   transformation, symmetrization).
//! - [`Metric`] and [`Connection`]: coordinate-dependent metrics, their
//!   inverses, line elements and Christoffel symbols by finite differences.
//! - [`Curvature`]: Riemann, Ricci, Einstein and Weyl tensors, the Ricci and
//!   Kretschmann scalars, and geodesic deviation.
//!
//! Zero I/O. Every operation is a pure function of its inputs and returns a
//! freshly allocated result; curvature is recomputed on every call.

pub mod builders;
pub mod connection;
pub mod constants;
pub mod curvature;
pub mod diff;
pub mod error;
pub mod linalg;
pub mod lorentz;
pub mod metric;
pub mod serde_compat;
pub mod spacetimes;
pub mod tensor;

pub use connection::Connection;
pub use constants::{
    DEFAULT_CONNECTION_STEP, DEFAULT_METRIC_STEP, EPSILON, FLATNESS_TOLERANCE,
    INVERSE_PAIR_TOLERANCE, NULL_TOLERANCE,
};
pub use curvature::{Curvature, GeodesicDeviation, Weyl};
pub use diff::FiniteDifference;
pub use error::{Result, TensorError};
pub use metric::{ConstantMetric, FunctionMetric, Interval, Metric};
pub use serde_compat::{CURRENT_VERSION, TensorSnapshot, export_json, import_json};
pub use spacetimes::{flrw, minkowski, schwarzschild, two_sphere};
pub use tensor::{MultiIndices, Tensor, Variance};

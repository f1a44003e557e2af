//! JSON snapshot format for tensors.
//!
//! A snapshot carries rank, dimensions, per-slot variance (`"co"` /
//! `"contra"`) and the flat row-major components. Decoding goes back through
//! the tensor constructor, so a malformed snapshot never yields a tensor.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TensorError};
use crate::tensor::{Tensor, Variance};

pub const CURRENT_VERSION: &str = "1";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorSnapshot {
    #[serde(default = "default_version")]
    pub version: String,
    pub rank: usize,
    pub dimensions: Vec<usize>,
    pub variance: Vec<Variance>,
    pub components: Vec<f64>,
}

fn default_version() -> String {
    CURRENT_VERSION.to_string()
}

impl From<Tensor> for TensorSnapshot {
    fn from(t: Tensor) -> Self {
        Self {
            version: default_version(),
            rank: t.rank(),
            dimensions: t.dimensions().to_vec(),
            variance: t.variance().to_vec(),
            components: t.components().to_vec(),
        }
    }
}

impl TryFrom<TensorSnapshot> for Tensor {
    type Error = TensorError;

    fn try_from(s: TensorSnapshot) -> Result<Self> {
        if s.rank != s.dimensions.len() {
            return Err(TensorError::ShapeMismatch(format!(
                "snapshot rank {} but {} dimensions",
                s.rank,
                s.dimensions.len()
            )));
        }
        Tensor::from_components(s.dimensions, s.variance, s.components)
    }
}

/// Serialize a tensor to pretty-printed JSON.
pub fn export_json(tensor: &Tensor) -> Result<String> {
    Ok(serde_json::to_string_pretty(tensor)?)
}

/// Parse a tensor from JSON, re-validating every structural invariant.
pub fn import_json(json: &str) -> Result<Tensor> {
    let snapshot: TensorSnapshot = serde_json::from_str(json)?;
    Tensor::try_from(snapshot)
}

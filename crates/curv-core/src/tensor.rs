use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{EPSILON, INVERSE_PAIR_TOLERANCE};
use crate::error::{Result, TensorError};
use crate::serde_compat::TensorSnapshot;

/// Position of a single tensor index: lower (covariant) or upper (contravariant).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variance {
    #[serde(rename = "co")]
    Covariant,
    #[serde(rename = "contra")]
    Contravariant,
}

impl Variance {
    pub fn flipped(self) -> Self {
        match self {
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Covariant => write!(f, "covariant"),
            Variance::Contravariant => write!(f, "contravariant"),
        }
    }
}

const JACOBIAN_VARIANCE: [Variance; 2] = [Variance::Contravariant, Variance::Covariant];

/// Arbitrary-rank multi-index array of `f64` with a variance per index slot.
///
/// Components are stored flat in row-major order; strides are computed once
/// at construction and the component count never changes afterwards. Every
/// algebraic operation returns a fresh tensor and leaves its operands alone.
///
/// A rank-0 tensor is a scalar: one component, empty dimension and variance
/// lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "TensorSnapshot", into = "TensorSnapshot")]
pub struct Tensor {
    dimensions: Vec<usize>,
    variance: Vec<Variance>,
    strides: Vec<usize>,
    components: Vec<f64>,
}

impl Tensor {
    /// Zero-initialized tensor.
    pub fn new(dimensions: Vec<usize>, variance: Vec<Variance>) -> Result<Self> {
        let len = validated_len(&dimensions, &variance)?;
        Ok(Self::from_parts(dimensions, variance, vec![0.0; len]))
    }

    /// Tensor with explicit row-major components.
    pub fn from_components(
        dimensions: Vec<usize>,
        variance: Vec<Variance>,
        components: Vec<f64>,
    ) -> Result<Self> {
        let len = validated_len(&dimensions, &variance)?;
        if components.len() != len {
            return Err(TensorError::ShapeMismatch(format!(
                "expected {len} components for dimensions {dimensions:?}, got {}",
                components.len()
            )));
        }
        Ok(Self::from_parts(dimensions, variance, components))
    }

    pub(crate) fn from_parts(
        dimensions: Vec<usize>,
        variance: Vec<Variance>,
        components: Vec<f64>,
    ) -> Self {
        let mut strides = vec![1; dimensions.len()];
        for k in (0..dimensions.len().saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * dimensions[k + 1];
        }
        Self {
            dimensions,
            variance,
            strides,
            components,
        }
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    pub fn variance(&self) -> &[Variance] {
        &self.variance
    }

    pub fn components(&self) -> &[f64] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Flat row-major offset of a multi-index.
    pub fn offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.rank()
            || index.iter().zip(&self.dimensions).any(|(&i, &d)| i >= d)
        {
            return Err(TensorError::IndexOutOfRange {
                index: index.to_vec(),
                dimensions: self.dimensions.clone(),
            });
        }
        Ok(index.iter().zip(&self.strides).map(|(i, s)| i * s).sum())
    }

    pub fn get(&self, index: &[usize]) -> Result<f64> {
        Ok(self.components[self.offset(index)?])
    }

    pub fn set(&mut self, index: &[usize], value: f64) -> Result<()> {
        let offset = self.offset(index)?;
        self.components[offset] = value;
        Ok(())
    }

    /// Component of a rank-0 tensor.
    pub fn value(&self) -> Result<f64> {
        if self.rank() != 0 {
            return Err(TensorError::ShapeMismatch(format!(
                "value() requires a scalar, got rank {}",
                self.rank()
            )));
        }
        Ok(self.components[0])
    }

    /// Multi-index for a flat offset. Caller guarantees `flat < len()`.
    pub(crate) fn unravel(&self, flat: usize) -> Vec<usize> {
        self.dimensions
            .iter()
            .zip(&self.strides)
            .map(|(d, s)| (flat / s) % d)
            .collect()
    }

    /// All multi-indices in row-major order.
    pub fn multi_indices(&self) -> MultiIndices {
        MultiIndices::new(self.dimensions.clone())
    }

    pub fn norm_max(&self) -> f64 {
        self.components.iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    // --- Structural checks ---

    fn check_same_shape(&self, other: &Self, op: &str) -> Result<()> {
        if self.dimensions != other.dimensions || self.variance != other.variance {
            return Err(TensorError::ShapeMismatch(format!(
                "{op}: {:?}/{:?} vs {:?}/{:?}",
                self.dimensions, self.variance, other.dimensions, other.variance
            )));
        }
        Ok(())
    }

    fn check_slot(&self, i: usize) -> Result<()> {
        if i >= self.rank() {
            return Err(TensorError::ShapeMismatch(format!(
                "index slot {i} out of range for rank {}",
                self.rank()
            )));
        }
        Ok(())
    }

    fn check_pair(&self, i: usize, j: usize, op: &str) -> Result<()> {
        self.check_slot(i)?;
        self.check_slot(j)?;
        if i == j {
            return Err(TensorError::InvalidArgument(format!(
                "{op}: index slots must differ, got ({i}, {j})"
            )));
        }
        if self.dimensions[i] != self.dimensions[j] {
            return Err(TensorError::ShapeMismatch(format!(
                "{op}: slot {i} has dimension {}, slot {j} has dimension {}",
                self.dimensions[i], self.dimensions[j]
            )));
        }
        Ok(())
    }

    // --- Element-wise algebra ---

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "add")?;
        Ok(self.zip_with(other, |a, b| a + b))
    }

    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "subtract")?;
        Ok(self.zip_with(other, |a, b| a - b))
    }

    pub fn scale(&self, factor: f64) -> Self {
        self.map(|c| c * factor)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            components: self.components.iter().map(|&c| f(c)).collect(),
            ..self.clone()
        }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            components: self
                .components
                .iter()
                .zip(&other.components)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            ..self.clone()
        }
    }

    /// Outer product. Dimensions and variance concatenate, `self` first.
    pub fn tensor_product(&self, other: &Self) -> Self {
        let mut dimensions = self.dimensions.clone();
        dimensions.extend_from_slice(&other.dimensions);
        let mut variance = self.variance.clone();
        variance.extend_from_slice(&other.variance);

        let mut components = Vec::with_capacity(self.len() * other.len());
        for &a in &self.components {
            components.extend(other.components.iter().map(|&b| a * b));
        }
        Self::from_parts(dimensions, variance, components)
    }

    // --- Contraction ---

    /// Sum over the diagonal where slots `i` and `j` take equal values.
    ///
    /// The result has rank `rank - 2`; contracting a rank-2 tensor yields a
    /// scalar. Pairing two slots of the same variance is permitted but logged.
    pub fn contract(&self, i: usize, j: usize) -> Result<Self> {
        self.check_pair(i, j, "contract")?;
        if self.variance[i] == self.variance[j] {
            tracing::warn!(
                "contracting slots {i} and {j} which are both {}",
                self.variance[i]
            );
        }

        let keep: Vec<usize> = (0..self.rank()).filter(|&k| k != i && k != j).collect();
        let dimensions: Vec<usize> = keep.iter().map(|&k| self.dimensions[k]).collect();
        let variance: Vec<Variance> = keep.iter().map(|&k| self.variance[k]).collect();
        let mut result = Self::new(dimensions, variance)?;

        for (flat, &c) in self.components.iter().enumerate() {
            let idx = self.unravel(flat);
            if idx[i] != idx[j] {
                continue;
            }
            let target: usize = keep
                .iter()
                .zip(&result.strides)
                .map(|(&k, s)| idx[k] * s)
                .sum();
            result.components[target] += c;
        }
        Ok(result)
    }

    /// Trace of a rank-2 tensor, as a plain number.
    pub fn trace(&self) -> Result<f64> {
        if self.rank() != 2 {
            return Err(TensorError::ShapeMismatch(format!(
                "trace requires rank 2, got rank {}",
                self.rank()
            )));
        }
        self.contract(0, 1)?.value()
    }

    /// Full contraction `A_{abc…} B^{abc…}` of two tensors of identical
    /// dimensions, slot by slot.
    pub fn contract_all(&self, other: &Self) -> Result<f64> {
        if self.dimensions != other.dimensions {
            return Err(TensorError::ShapeMismatch(format!(
                "contract_all: dimensions {:?} vs {:?}",
                self.dimensions, other.dimensions
            )));
        }
        for (k, (a, b)) in self.variance.iter().zip(&other.variance).enumerate() {
            if a == b {
                tracing::warn!("contract_all: slot {k} is {a} on both operands");
            }
        }
        Ok(self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a * b)
            .sum())
    }

    // --- Index gymnastics ---

    /// `T'^{…μ…} = g^{μν} T_{…ν…}`. Slot `i` must be covariant and
    /// `inverse_metric` a rank-2 contravariant tensor.
    pub fn raise_index(&self, i: usize, inverse_metric: &Self) -> Result<Self> {
        self.apply_metric(i, inverse_metric, Variance::Covariant)
    }

    /// `T'_{…μ…} = g_{μν} T^{…ν…}`. Slot `i` must be contravariant and
    /// `metric` a rank-2 covariant tensor.
    pub fn lower_index(&self, i: usize, metric: &Self) -> Result<Self> {
        self.apply_metric(i, metric, Variance::Contravariant)
    }

    fn apply_metric(&self, i: usize, metric: &Self, source: Variance) -> Result<Self> {
        self.check_slot(i)?;
        let target = source.flipped();
        if self.variance[i] != source {
            return Err(TensorError::VarianceViolation {
                position: i,
                expected: source,
                found: self.variance[i],
            });
        }
        if metric.rank() != 2 {
            return Err(TensorError::ShapeMismatch(format!(
                "metric must be rank 2, got rank {}",
                metric.rank()
            )));
        }
        if let Some(position) = metric.variance.iter().position(|&v| v != target) {
            return Err(TensorError::VarianceViolation {
                position,
                expected: target,
                found: metric.variance[position],
            });
        }
        let n = self.dimensions[i];
        if metric.dimensions != [n, n] {
            return Err(TensorError::ShapeMismatch(format!(
                "metric dimensions {:?} do not match slot {i} of dimension {n}",
                metric.dimensions
            )));
        }

        let mut variance = self.variance.clone();
        variance[i] = target;
        let stride = self.strides[i];
        let mut components = vec![0.0; self.len()];
        for (flat, out) in components.iter_mut().enumerate() {
            let mu = (flat / stride) % n;
            let base = flat - mu * stride;
            *out = (0..n)
                .map(|nu| metric.components[mu * n + nu] * self.components[base + nu * stride])
                .sum();
        }
        Ok(Self::from_parts(self.dimensions.clone(), variance, components))
    }

    /// Re-express the tensor under a coordinate change.
    ///
    /// `jacobian[a][b] = ∂x'^a/∂x^b` and `inverse_jacobian[a][b] = ∂x^a/∂x'^b`.
    /// Both matrices are mixed `(up, down)`. Contravariant slots transform
    /// with the Jacobian, covariant slots with its inverse. Every new component sums over every old multi-index, so
    /// the cost is O(n^(2·rank)).
    pub fn transform(&self, jacobian: &Self, inverse_jacobian: &Self) -> Result<Self> {
        if self.rank() == 0 {
            return Ok(self.clone());
        }
        let n = self.dimensions[0];
        if self.dimensions.iter().any(|&d| d != n) {
            return Err(TensorError::ShapeMismatch(format!(
                "transform requires equal dimensions in every slot, got {:?}",
                self.dimensions
            )));
        }
        for (name, m) in [("jacobian", jacobian), ("inverse jacobian", inverse_jacobian)] {
            if m.dimensions != [n, n] {
                return Err(TensorError::ShapeMismatch(format!(
                    "{name} must be {n}x{n}, got {:?}",
                    m.dimensions
                )));
            }
            if let Some(position) = (0..2).find(|&k| m.variance[k] != JACOBIAN_VARIANCE[k]) {
                return Err(TensorError::VarianceViolation {
                    position,
                    expected: JACOBIAN_VARIANCE[position],
                    found: m.variance[position],
                });
            }
        }
        check_inverse_pair(jacobian, inverse_jacobian, n)?;

        let mut components = vec![0.0; self.len()];
        for (new_flat, out) in components.iter_mut().enumerate() {
            let new_idx = self.unravel(new_flat);
            let mut sum = 0.0;
            for (old_flat, &c) in self.components.iter().enumerate() {
                if c == 0.0 {
                    continue;
                }
                let old_idx = self.unravel(old_flat);
                let mut factor = c;
                for (slot, variance) in self.variance.iter().enumerate() {
                    let (a, b) = (new_idx[slot], old_idx[slot]);
                    factor *= match variance {
                        Variance::Contravariant => jacobian.components[a * n + b],
                        Variance::Covariant => inverse_jacobian.components[b * n + a],
                    };
                    if factor == 0.0 {
                        break;
                    }
                }
                sum += factor;
            }
            *out = sum;
        }
        Ok(Self::from_parts(
            self.dimensions.clone(),
            self.variance.clone(),
            components,
        ))
    }

    // --- Symmetry ---

    /// `½(T_{…i…j…} + T_{…j…i…})`
    pub fn symmetrize(&self, i: usize, j: usize) -> Result<Self> {
        self.symmetry_part(i, j, 1.0)
    }

    /// `½(T_{…i…j…} - T_{…j…i…})`
    pub fn antisymmetrize(&self, i: usize, j: usize) -> Result<Self> {
        self.symmetry_part(i, j, -1.0)
    }

    fn symmetry_part(&self, i: usize, j: usize, sign: f64) -> Result<Self> {
        self.check_symmetry_pair(i, j)?;
        let mut components = vec![0.0; self.len()];
        for (flat, out) in components.iter_mut().enumerate() {
            let swapped = self.swapped_offset(flat, i, j);
            *out = 0.5 * (self.components[flat] + sign * self.components[swapped]);
        }
        Ok(Self::from_parts(
            self.dimensions.clone(),
            self.variance.clone(),
            components,
        ))
    }

    pub fn is_symmetric(&self, i: usize, j: usize, tolerance: f64) -> Result<bool> {
        self.symmetry_holds(i, j, tolerance, 1.0)
    }

    pub fn is_antisymmetric(&self, i: usize, j: usize, tolerance: f64) -> Result<bool> {
        self.symmetry_holds(i, j, tolerance, -1.0)
    }

    fn symmetry_holds(&self, i: usize, j: usize, tolerance: f64, sign: f64) -> Result<bool> {
        self.check_symmetry_pair(i, j)?;
        Ok((0..self.len()).all(|flat| {
            let swapped = self.swapped_offset(flat, i, j);
            (self.components[flat] - sign * self.components[swapped]).abs() <= tolerance
        }))
    }

    fn check_symmetry_pair(&self, i: usize, j: usize) -> Result<()> {
        self.check_pair(i, j, "symmetry")?;
        if self.variance[i] != self.variance[j] {
            return Err(TensorError::VarianceViolation {
                position: j,
                expected: self.variance[i],
                found: self.variance[j],
            });
        }
        Ok(())
    }

    fn swapped_offset(&self, flat: usize, i: usize, j: usize) -> usize {
        let a = (flat / self.strides[i]) % self.dimensions[i];
        let b = (flat / self.strides[j]) % self.dimensions[j];
        flat - a * self.strides[i] - b * self.strides[j] + b * self.strides[i] + a * self.strides[j]
    }

    // --- Comparison ---

    /// Same rank, dimensions and variance, and every component within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.dimensions == other.dimensions
            && self.variance == other.variance
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Validates shape and returns the component count.
pub(crate) fn validated_len(dimensions: &[usize], variance: &[Variance]) -> Result<usize> {
    if dimensions.len() != variance.len() {
        return Err(TensorError::ShapeMismatch(format!(
            "{} dimensions but {} variance entries",
            dimensions.len(),
            variance.len()
        )));
    }
    if let Some(k) = dimensions.iter().position(|&d| d == 0) {
        return Err(TensorError::ShapeMismatch(format!(
            "dimension of slot {k} must be positive"
        )));
    }
    dimensions
        .iter()
        .try_fold(1usize, |len, &d| len.checked_mul(d))
        .ok_or_else(|| {
            TensorError::ShapeMismatch(format!(
                "component count for dimensions {dimensions:?} overflows usize"
            ))
        })
}

fn check_inverse_pair(jacobian: &Tensor, inverse: &Tensor, n: usize) -> Result<()> {
    let scale = jacobian.norm_max().max(1.0) * inverse.norm_max().max(1.0);
    for a in 0..n {
        for b in 0..n {
            let product: f64 = (0..n)
                .map(|k| jacobian.components[a * n + k] * inverse.components[k * n + b])
                .sum();
            let expected = if a == b { 1.0 } else { 0.0 };
            if (product - expected).abs() > INVERSE_PAIR_TOLERANCE * scale {
                return Err(TensorError::InvalidArgument(
                    "inverse jacobian does not invert the jacobian".to_string(),
                ));
            }
        }
    }
    Ok(())
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, EPSILON)
    }
}

impl std::ops::Neg for Tensor {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: String = self
            .variance
            .iter()
            .map(|v| match v {
                Variance::Covariant => '_',
                Variance::Contravariant => '^',
            })
            .collect();
        write!(f, "T{slots}{:?} [", self.dimensions)?;
        for (k, c) in self.components.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c:.6e}")?;
        }
        write!(f, "]")
    }
}

/// Row-major iterator over every multi-index of a shape.
pub struct MultiIndices {
    dimensions: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl MultiIndices {
    pub fn new(dimensions: Vec<usize>) -> Self {
        let next = if dimensions.contains(&0) {
            None
        } else {
            Some(vec![0; dimensions.len()])
        };
        Self { dimensions, next }
    }
}

impl Iterator for MultiIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut succ = current.clone();
        for pos in (0..succ.len()).rev() {
            succ[pos] += 1;
            if succ[pos] < self.dimensions[pos] {
                self.next = Some(succ);
                break;
            }
            succ[pos] = 0;
        }
        Some(current)
    }
}

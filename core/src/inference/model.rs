//! The model capability shared by wrapped models and their wrappers.
//!
//! Anything that can be called with an ordered list of tensors and returns
//! an ordered list of tensors, while declaring the signature of both lists,
//! implements [`Model`]. The order-fixing wrapper depends on nothing else.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{FixerError, Result};

/// Declared signature of a single model input or output.
///
/// Elements are `f32`, the only type [`TensorData`] carries. `None`
/// dimensions are unknown until a value is supplied, typically the batch
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TensorSpec {
    /// Optional tensor name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Shape with unknown dimensions as `None`.
    pub shape: Vec<Option<usize>>,
}

impl TensorSpec {
    /// Create an unnamed spec.
    pub fn new(shape: Vec<Option<usize>>) -> Self {
        Self { name: None, shape }
    }

    /// Create a spec with an unknown leading batch dimension.
    pub fn batched(dims: &[usize]) -> Self {
        let shape = std::iter::once(None)
            .chain(dims.iter().copied().map(Some))
            .collect();
        Self::new(shape)
    }

    /// Attach a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Shape as signed integers, `-1` for unknown dimensions.
    pub fn shape_i64(&self) -> Vec<i64> {
        self.shape
            .iter()
            .map(|d| d.map(|d| d as i64).unwrap_or(-1))
            .collect()
    }

    /// Check if a concrete tensor satisfies this spec.
    pub fn accepts(&self, tensor: &TensorData) -> bool {
        self.ndim() == tensor.ndim()
            && self
                .shape
                .iter()
                .zip(tensor.shape())
                .all(|(want, &got)| want.map_or(true, |want| want == got))
    }

    /// Check if two specs can describe the same tensor.
    ///
    /// Unknown dimensions are compatible with anything; names are ignored.
    pub fn is_compatible_with(&self, other: &TensorSpec) -> bool {
        self.ndim() == other.ndim()
            && self.shape.iter().zip(&other.shape).all(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            })
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "f32{:?}", self.shape_i64())
    }
}

/// Tensor value passed into and out of models.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorData {
    /// The tensor data as a dynamic-dimensional array.
    pub data: ArrayD<f32>,
}

impl TensorData {
    /// Wrap an array.
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    /// Create a tensor from a flat vector and a shape.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        let data = ArrayD::from_shape_vec(ndarray::IxDyn(shape), data)
            .map_err(|e| FixerError::inference(format!("Array shape error: {}", e)))?;
        Ok(Self { data })
    }

    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Get the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<ArrayD<f32>> for TensorData {
    fn from(data: ArrayD<f32>) -> Self {
        Self { data }
    }
}

/// A callable unit of computation with a declared signature.
///
/// Implementations own their computation entirely; callers only rely on the
/// order of inputs and outputs matching [`input_specs`](Model::input_specs)
/// and [`output_specs`](Model::output_specs).
pub trait Model: Send + Sync {
    /// Name used to refer to this model in persisted configuration.
    fn name(&self) -> &str;

    /// Declared inputs, in call order.
    fn input_specs(&self) -> &[TensorSpec];

    /// Declared outputs, in return order.
    fn output_specs(&self) -> &[TensorSpec];

    /// Run the model.
    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>>;

    /// Propagate input specs to output specs without computing anything.
    ///
    /// The default checks `inputs` against the declared inputs and returns
    /// the declared outputs.
    fn trace(&self, inputs: &[TensorSpec]) -> Result<Vec<TensorSpec>> {
        check_specs(self.name(), self.input_specs(), inputs)?;
        Ok(self.output_specs().to_vec())
    }
}

/// Check that `given` matches `declared` position by position.
pub(crate) fn check_specs(
    model: &str,
    declared: &[TensorSpec],
    given: &[TensorSpec],
) -> Result<()> {
    if declared.len() != given.len() {
        return Err(FixerError::signature(format!(
            "{} expects {} inputs, got {}",
            model,
            declared.len(),
            given.len()
        )));
    }
    for (i, (want, got)) in declared.iter().zip(given).enumerate() {
        if !want.is_compatible_with(got) {
            return Err(FixerError::signature(format!(
                "{} input {}: expected {}, got {}",
                model, i, want, got
            )));
        }
    }
    Ok(())
}

impl<M: Model + ?Sized> Model for Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_specs(&self) -> &[TensorSpec] {
        (**self).input_specs()
    }

    fn output_specs(&self) -> &[TensorSpec] {
        (**self).output_specs()
    }

    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        (**self).call(inputs)
    }

    fn trace(&self, inputs: &[TensorSpec]) -> Result<Vec<TensorSpec>> {
        (**self).trace(inputs)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_specs(&self) -> &[TensorSpec] {
        (**self).input_specs()
    }

    fn output_specs(&self) -> &[TensorSpec] {
        (**self).output_specs()
    }

    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        (**self).call(inputs)
    }

    fn trace(&self, inputs: &[TensorSpec]) -> Result<Vec<TensorSpec>> {
        (**self).trace(inputs)
    }
}

//! Small models for unit tests.

use super::model::{Model, TensorData, TensorSpec};
use crate::error::{FixerError, Result};

/// Scalar model whose outputs reveal the order its inputs arrived in.
///
/// Input `i` is weighted by `10^i` and output `j` is `(j + 1)` times the
/// weighted sum, so `[1, 2, 3, 4]` yields `4321, 8642, 12963, ...`.
#[derive(Debug)]
pub(crate) struct DigitMixModel {
    inputs: Vec<TensorSpec>,
    outputs: Vec<TensorSpec>,
}

impl DigitMixModel {
    pub(crate) fn new(num_inputs: usize, num_outputs: usize) -> Self {
        let spec = |prefix: &str, i: usize| {
            TensorSpec::new(vec![Some(1)]).with_name(format!("{}_{}", prefix, i))
        };
        Self {
            inputs: (0..num_inputs).map(|i| spec("in", i)).collect(),
            outputs: (0..num_outputs).map(|j| spec("out", j)).collect(),
        }
    }
}

impl Model for DigitMixModel {
    fn name(&self) -> &str {
        "digit_mix"
    }

    fn input_specs(&self) -> &[TensorSpec] {
        &self.inputs
    }

    fn output_specs(&self) -> &[TensorSpec] {
        &self.outputs
    }

    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        if inputs.len() != self.inputs.len() {
            return Err(FixerError::inference(format!(
                "expected {} inputs, got {}",
                self.inputs.len(),
                inputs.len()
            )));
        }
        let sum: f32 = inputs
            .iter()
            .enumerate()
            .map(|(i, t)| t.data.sum() * 10f32.powi(i as i32))
            .sum();
        (0..self.outputs.len())
            .map(|j| TensorData::from_shape_vec(&[1], vec![(j + 1) as f32 * sum]))
            .collect()
    }
}

/// Model that always fails.
#[derive(Debug)]
pub(crate) struct FailingModel {
    inputs: Vec<TensorSpec>,
}

impl FailingModel {
    pub(crate) fn new(num_inputs: usize) -> Self {
        Self {
            inputs: vec![TensorSpec::new(vec![Some(1)]); num_inputs],
        }
    }
}

impl Model for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    fn input_specs(&self) -> &[TensorSpec] {
        &self.inputs
    }

    fn output_specs(&self) -> &[TensorSpec] {
        &[]
    }

    fn call(&self, _inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        Err(FixerError::inference("weights exploded"))
    }
}

pub(crate) fn scalars(values: &[f32]) -> Vec<TensorData> {
    values
        .iter()
        .map(|&v| TensorData::from_shape_vec(&[1], vec![v]).unwrap())
        .collect()
}

pub(crate) fn values(tensors: &[TensorData]) -> Vec<f32> {
    tensors.iter().map(|t| t.data.sum()).collect()
}

pub(crate) fn names(specs: &[TensorSpec]) -> Vec<&str> {
    specs.iter().filter_map(|s| s.name.as_deref()).collect()
}

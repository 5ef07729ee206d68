//! Demo model with several inputs and several outputs.
//!
//! All inputs are `[batch, height, width, channels]` feature maps that get
//! concatenated along the channel axis. Each output head is a 1x1
//! convolution with ReLU over the concatenated map.

use ndarray::{concatenate, Array1, Array2, ArrayD, ArrayView, Axis, IxDyn};

use super::model::{Model, TensorData, TensorSpec};
use crate::error::{FixerError, Result};

/// One pointwise convolution head.
#[derive(Debug, Clone)]
struct Head {
    /// `[in_channels, out_channels]`
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl Head {
    /// Deterministic weights so runs are reproducible without a checkpoint.
    fn new(index: usize, in_channels: usize, out_channels: usize) -> Self {
        let weights = Array2::from_shape_fn((in_channels, out_channels), |(c, o)| {
            let k = (c * 31 + o * 17 + index * 7) % 13;
            k as f32 / 13.0 - 0.5
        });
        let bias = Array1::from_shape_fn(out_channels, |o| ((o + index) % 3) as f32 * 0.1);
        Self { weights, bias }
    }
}

/// Concatenation followed by pointwise convolution heads.
#[derive(Debug, Clone)]
pub struct ConcatConvModel {
    name: String,
    height: usize,
    width: usize,
    heads: Vec<Head>,
    inputs: Vec<TensorSpec>,
    outputs: Vec<TensorSpec>,
}

impl ConcatConvModel {
    /// Build a model over `height x width` maps.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there are no inputs, no heads or a
    /// zero-sized dimension.
    pub fn new(
        name: impl Into<String>,
        height: usize,
        width: usize,
        input_channels: &[usize],
        head_channels: &[usize],
    ) -> Result<Self> {
        if input_channels.is_empty() || head_channels.is_empty() {
            return Err(FixerError::config("Model needs at least one input and one head"));
        }
        if height == 0 || width == 0 || input_channels.contains(&0) || head_channels.contains(&0) {
            return Err(FixerError::config("Model dimensions must be non-zero"));
        }

        let total: usize = input_channels.iter().sum();
        let heads = head_channels
            .iter()
            .enumerate()
            .map(|(i, &out)| Head::new(i, total, out))
            .collect();
        let inputs = input_channels
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                TensorSpec::batched(&[height, width, c]).with_name(format!("input_{}", i + 1))
            })
            .collect();
        let outputs = head_channels
            .iter()
            .enumerate()
            .map(|(i, &o)| {
                TensorSpec::batched(&[height, width, o]).with_name(format!("conv_{}", i + 1))
            })
            .collect();

        Ok(Self {
            name: name.into(),
            height,
            width,
            heads,
            inputs,
            outputs,
        })
    }

    fn check_inputs(&self, inputs: &[TensorData]) -> Result<usize> {
        if inputs.len() != self.inputs.len() {
            return Err(FixerError::inference(format!(
                "{} expects {} inputs, got {}",
                self.name,
                self.inputs.len(),
                inputs.len()
            )));
        }
        let batch = inputs[0].shape().first().copied().unwrap_or(0);
        for (i, (spec, tensor)) in self.inputs.iter().zip(inputs).enumerate() {
            if !spec.accepts(tensor) || tensor.shape()[0] != batch {
                return Err(FixerError::inference(format!(
                    "{} input {}: expected {} with batch {}, got shape {:?}",
                    self.name,
                    i,
                    spec,
                    batch,
                    tensor.shape()
                )));
            }
        }
        Ok(batch)
    }
}

impl Model for ConcatConvModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_specs(&self) -> &[TensorSpec] {
        &self.inputs
    }

    fn output_specs(&self) -> &[TensorSpec] {
        &self.outputs
    }

    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        let batch = self.check_inputs(&inputs)?;

        let views: Vec<ArrayView<f32, IxDyn>> = inputs.iter().map(|t| t.data.view()).collect();
        let stacked = concatenate(Axis(3), &views)
            .map_err(|e| FixerError::inference(format!("Concatenation failed: {}", e)))?;

        let pixels = batch * self.height * self.width;
        let channels = stacked.shape()[3];
        let flat = stacked
            .as_standard_layout()
            .into_owned()
            .into_shape((pixels, channels))
            .map_err(|e| FixerError::inference(format!("Array shape error: {}", e)))?;

        self.heads
            .iter()
            .map(|head| {
                let out = (flat.dot(&head.weights) + &head.bias).mapv(|v| v.max(0.0));
                let out_channels = out.ncols();
                let data: ArrayD<f32> = out
                    .into_shape(IxDyn(&[batch, self.height, self.width, out_channels]))
                    .map_err(|e| FixerError::inference(format!("Array shape error: {}", e)))?;
                Ok(TensorData::new(data))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> ConcatConvModel {
        ConcatConvModel::new("concat_conv", 3, 3, &[4, 8, 16, 32], &[4, 8, 16]).unwrap()
    }

    fn ones(shape: &[usize], value: f32) -> TensorData {
        TensorData::new(ArrayD::from_elem(IxDyn(shape), value))
    }

    #[test]
    fn test_signature() {
        let model = model();
        let shapes: Vec<Vec<i64>> = model.input_specs().iter().map(|s| s.shape_i64()).collect();
        assert_eq!(shapes[0], vec![-1, 3, 3, 4]);
        assert_eq!(shapes[3], vec![-1, 3, 3, 32]);
        assert_eq!(model.output_specs()[2].shape_i64(), vec![-1, 3, 3, 16]);
        assert_eq!(model.output_specs()[0].name.as_deref(), Some("conv_1"));
    }

    #[test]
    fn test_call_shapes_and_relu() {
        let model = model();
        let inputs = vec![
            ones(&[2, 3, 3, 4], 1.0),
            ones(&[2, 3, 3, 8], -1.0),
            ones(&[2, 3, 3, 16], 0.5),
            ones(&[2, 3, 3, 32], 0.25),
        ];
        let outputs = model.call(inputs).unwrap();
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].shape(), &[2, 3, 3, 4]);
        assert_eq!(outputs[1].shape(), &[2, 3, 3, 8]);
        assert_eq!(outputs[2].shape(), &[2, 3, 3, 16]);
        for out in &outputs {
            assert!(out.data.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_single_pixel_matches_manual_dot() {
        let model = ConcatConvModel::new("tiny", 1, 1, &[1, 2], &[2]).unwrap();
        let a = TensorData::from_shape_vec(&[1, 1, 1, 1], vec![1.0]).unwrap();
        let b = TensorData::from_shape_vec(&[1, 1, 1, 2], vec![2.0, 3.0]).unwrap();
        let out = model.call(vec![a, b]).unwrap();

        let head = &model.heads[0];
        let x = [1.0f32, 2.0, 3.0];
        for o in 0..2 {
            let expected: f32 = x
                .iter()
                .enumerate()
                .map(|(c, v)| v * head.weights[[c, o]])
                .sum::<f32>()
                + head.bias[o];
            assert_abs_diff_eq!(out[0].data[[0, 0, 0, o]], expected.max(0.0), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let model = model();
        assert!(matches!(
            model.call(vec![ones(&[1, 3, 3, 4], 1.0)]),
            Err(FixerError::Inference(_))
        ));

        let swapped = vec![
            ones(&[1, 3, 3, 8], 1.0),
            ones(&[1, 3, 3, 4], 1.0),
            ones(&[1, 3, 3, 16], 1.0),
            ones(&[1, 3, 3, 32], 1.0),
        ];
        assert!(matches!(model.call(swapped), Err(FixerError::Inference(_))));

        let mixed_batch = vec![
            ones(&[1, 3, 3, 4], 1.0),
            ones(&[2, 3, 3, 8], 1.0),
            ones(&[1, 3, 3, 16], 1.0),
            ones(&[1, 3, 3, 32], 1.0),
        ];
        assert!(model.call(mixed_batch).is_err());
    }

    #[test]
    fn test_rejects_empty_config() {
        assert!(ConcatConvModel::new("empty", 3, 3, &[], &[4]).is_err());
        assert!(ConcatConvModel::new("flat", 0, 3, &[4], &[4]).is_err());
    }
}

//! JSON tensor files fed to the `infer` command.
//!
//! ```json
//! { "inputs": [ { "data": [0.1, 0.2], "shape": [1, 2] } ] }
//! ```
//!
//! Tensors are listed in the order the called model declares its inputs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FixerError, Result};
use crate::inference::TensorData;

/// A list of input tensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFile {
    pub inputs: Vec<InputTensor>,
}

/// One tensor as a flat row-major buffer and its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl InputFile {
    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FixerError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build one [`TensorData`] per entry, keeping the file order.
    pub fn into_tensors(self) -> Result<Vec<TensorData>> {
        self.inputs
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                TensorData::from_shape_vec(&t.shape, t.data)
                    .map_err(|e| FixerError::config(format!("Input tensor {}: {}", i, e)))
            })
            .collect()
    }
}

impl From<&TensorData> for InputTensor {
    fn from(tensor: &TensorData) -> Self {
        Self {
            data: tensor.data.iter().copied().collect(),
            shape: tensor.shape().to_vec(),
        }
    }
}

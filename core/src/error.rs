//! Error types for iofix-rs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for iofix-rs operations.
pub type Result<T> = std::result::Result<T, FixerError>;

/// Errors that can occur while reordering or running models.
#[derive(Debug, Error)]
pub enum FixerError {
    /// Permutation is not a bijection over `0..len`.
    #[error("Invalid permutation {perm:?} over {len} indices")]
    InvalidPermutation { perm: Vec<usize>, len: usize },

    /// Permutation and sequence lengths differ.
    #[error("Length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Index is not valid for the sequence it is applied to.
    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Inputs do not match a declared signature.
    #[error("Signature mismatch: {0}")]
    Signature(String),

    /// Inference failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl FixerError {
    /// Create an invalid permutation error.
    pub fn invalid_permutation(perm: &[usize]) -> Self {
        Self::InvalidPermutation {
            perm: perm.to_vec(),
            len: perm.len(),
        }
    }

    /// Create a signature error.
    pub fn signature(msg: impl Into<String>) -> Self {
        Self::Signature(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FixerError::invalid_permutation(&[0, 0, 1]);
        assert_eq!(
            format!("{}", err),
            "Invalid permutation [0, 0, 1] over 3 indices"
        );

        let err = FixerError::LengthMismatch {
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            format!("{}", err),
            "Length mismatch: expected 3 elements, got 4"
        );

        let err = FixerError::config("unknown model");
        assert_eq!(format!("{}", err), "Configuration error: unknown model");

        let err = FixerError::FileNotFound(PathBuf::from("/path/to/manifest.json"));
        assert_eq!(format!("{}", err), "File not found: /path/to/manifest.json");
    }
}
